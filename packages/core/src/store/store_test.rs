//! Unit tests for the in-memory bean store
//!
//! Covers the store contract (upsert-by-replacement, idempotent delete,
//! snapshot replacement), event application semantics, and the derived view
//! queries.

use crate::models::{Bean, BeanChangeEvent, ChangeType};
use crate::store::{ApplyOutcome, BeanStore};

fn bean(id: &str) -> Bean {
    Bean::new(id, "task", format!("Bean {id}"))
}

// ========================================================================
// Store Contract Tests
// ========================================================================

#[test]
fn test_set_and_get() {
    let mut store = BeanStore::new();
    store.set(bean("b1"));

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("b1").map(|b| b.id.as_str()), Some("b1"));
    assert!(store.get("missing").is_none());
}

#[test]
fn test_set_replaces_whole_record() {
    let mut store = BeanStore::new();
    let mut first = bean("b1");
    first.tags = vec!["keep-me".to_string()];
    store.set(first);

    // Full replacement: the tag from the first version must not survive
    let mut second = bean("b1");
    second.status = "done".to_string();
    store.set(second);

    let stored = store.get("b1").unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(stored.status, "done");
    assert!(stored.tags.is_empty());
}

#[test]
fn test_remove_missing_is_noop() {
    let mut store = BeanStore::new();
    store.set(bean("b1"));

    assert!(store.remove("missing").is_none());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_clear_and_replace_all() {
    let mut store = BeanStore::new();
    store.set(bean("old1"));
    store.set(bean("old2"));

    store.replace_all(vec![bean("new1")]);
    assert_eq!(store.len(), 1);
    assert!(store.get("old1").is_none());
    assert!(store.get("new1").is_some());

    store.clear();
    assert!(store.is_empty());
}

#[test]
fn test_all_is_deterministic_for_a_given_state() {
    let mut store = BeanStore::new();
    store.set(bean("b3"));
    store.set(bean("b1"));
    store.set(bean("b2"));

    let ids: Vec<String> = store.all().into_iter().map(|b| b.id).collect();
    assert_eq!(ids, vec!["b1", "b2", "b3"]);
    // Same state, same sequence
    let again: Vec<String> = store.all().into_iter().map(|b| b.id).collect();
    assert_eq!(ids, again);
}

// ========================================================================
// Event Application Tests
// ========================================================================

#[test]
fn test_apply_created_inserts() {
    let mut store = BeanStore::new();
    let outcome = store.apply(BeanChangeEvent::created(bean("b1")));

    assert!(matches!(outcome, ApplyOutcome::Upserted(_)));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_apply_updated_replaces_in_place() {
    let mut store = BeanStore::new();
    store.set(bean("b1"));

    let mut updated = bean("b1");
    updated.status = "done".to_string();
    store.apply(BeanChangeEvent::updated(updated));

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("b1").unwrap().status, "done");
}

#[test]
fn test_apply_keys_by_payload_id_not_envelope() {
    let mut store = BeanStore::new();
    let event = BeanChangeEvent {
        change_type: ChangeType::Created,
        bean_id: "envelope-id".to_string(),
        bean: Some(bean("payload-id")),
    };

    store.apply(event);

    assert!(store.get("payload-id").is_some());
    assert!(store.get("envelope-id").is_none());
}

#[test]
fn test_apply_upsert_without_payload_is_ignored() {
    let mut store = BeanStore::new();
    store.set(bean("b1"));

    for change_type in [ChangeType::Created, ChangeType::Updated] {
        let outcome = store.apply(BeanChangeEvent {
            change_type,
            bean_id: "b1".to_string(),
            bean: None,
        });
        assert_eq!(outcome, ApplyOutcome::Ignored);
    }
    assert_eq!(store.len(), 1);
}

#[test]
fn test_apply_deleted_removes_by_envelope_id() {
    let mut store = BeanStore::new();
    store.set(bean("b1"));

    let outcome = store.apply(BeanChangeEvent::deleted("b1"));

    assert_eq!(
        outcome,
        ApplyOutcome::Removed {
            id: "b1".to_string()
        }
    );
    assert!(store.get("b1").is_none());
    assert!(store.is_empty());
}

#[test]
fn test_apply_deleted_for_missing_id_is_noop() {
    let mut store = BeanStore::new();
    store.set(bean("b1"));

    let outcome = store.apply(BeanChangeEvent::deleted("missing"));

    assert_eq!(outcome, ApplyOutcome::Ignored);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_apply_unknown_change_type_is_noop() {
    let mut store = BeanStore::new();
    store.set(bean("b1"));

    let outcome = store.apply(BeanChangeEvent {
        change_type: ChangeType::Unknown,
        bean_id: "b1".to_string(),
        bean: Some(bean("b1")),
    });

    assert_eq!(outcome, ApplyOutcome::Ignored);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_event_fold_is_last_write_wins_per_id() {
    // Any event sequence folds one at a time; the last write for each id wins
    let mut v1 = bean("b1");
    v1.status = "todo".to_string();
    let mut v2 = bean("b1");
    v2.status = "done".to_string();

    let events = vec![
        BeanChangeEvent::created(v1),
        BeanChangeEvent::created(bean("b2")),
        BeanChangeEvent::updated(v2.clone()),
        BeanChangeEvent::deleted("b2"),
    ];

    let mut store = BeanStore::new();
    for event in events {
        store.apply(event);
    }

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("b1"), Some(&v2));
}

// ========================================================================
// Derived View Tests
// ========================================================================

#[test]
fn test_by_status_exact_match() {
    let mut store = BeanStore::new();
    let mut open = bean("1");
    open.status = "open".to_string();
    let mut done = bean("2");
    done.status = "done".to_string();
    store.set(open);
    store.set(done);

    let result = store.by_status("open");
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, "1");
}

#[test]
fn test_by_type_and_by_tag() {
    let mut store = BeanStore::new();
    let mut feature = bean("b1");
    feature.bean_type = "feature".to_string();
    feature.tags = vec!["auth".to_string()];
    store.set(feature);
    store.set(bean("b2"));

    assert_eq!(store.by_type("feature").len(), 1);
    assert_eq!(store.by_type("epic").len(), 0);
    assert_eq!(store.by_tag("auth").len(), 1);
    assert_eq!(store.by_tag("frontend").len(), 0);
}

#[test]
fn test_children_and_blocked_by_scenario() {
    // CREATED {id:"b1", parentId:"b0", blockingIds:["b2"]} followed by
    // children("b0") == [b1] and blocked_by("b2") == [b1]
    let mut store = BeanStore::new();
    let mut b1 = bean("b1");
    b1.parent_id = Some("b0".to_string());
    b1.blocking_ids = vec!["b2".to_string()];
    store.apply(BeanChangeEvent::created(b1));

    let children: Vec<String> = store.children("b0").into_iter().map(|b| b.id).collect();
    assert_eq!(children, vec!["b1"]);

    let blocked: Vec<String> = store.blocked_by("b2").into_iter().map(|b| b.id).collect();
    assert_eq!(blocked, vec!["b1"]);
}

#[test]
fn test_dangling_references_are_no_match() {
    let mut store = BeanStore::new();
    store.set(bean("b1"));

    assert!(store.children("missing-parent").is_empty());
    assert!(store.blocked_by("missing-blocker").is_empty());
    assert!(store.blockers_of("missing-bean").is_empty());
    assert!(store.descendants("missing-bean").is_empty());
}

#[test]
fn test_roots() {
    let mut store = BeanStore::new();
    store.set(bean("epic1"));
    let mut child = bean("b1");
    child.parent_id = Some("epic1".to_string());
    store.set(child);

    let roots: Vec<String> = store.roots().into_iter().map(|b| b.id).collect();
    assert_eq!(roots, vec!["epic1"]);
}

#[test]
fn test_blockers_of_skips_dangling_and_duplicate_references() {
    let mut store = BeanStore::new();
    let mut blocked = bean("b1");
    blocked.blocking_ids = vec![
        "b2".to_string(),
        "gone".to_string(),
        "b2".to_string(),
    ];
    store.set(blocked);
    store.set(bean("b2"));

    let blockers: Vec<String> = store.blockers_of("b1").into_iter().map(|b| b.id).collect();
    assert_eq!(blockers, vec!["b2"]);
}

#[test]
fn test_descendants_walks_transitively() {
    let mut store = BeanStore::new();
    store.set(bean("epic1"));
    let mut child = bean("b1");
    child.parent_id = Some("epic1".to_string());
    store.set(child);
    let mut grandchild = bean("b2");
    grandchild.parent_id = Some("b1".to_string());
    store.set(grandchild);
    store.set(bean("unrelated"));

    let ids: Vec<String> = store.descendants("epic1").into_iter().map(|b| b.id).collect();
    assert_eq!(ids, vec!["b1", "b2"]);
}

#[test]
fn test_descendants_tolerates_parent_cycles() {
    // a -> b -> a: the store does not prevent this; reads must still terminate
    let mut store = BeanStore::new();
    let mut a = bean("a");
    a.parent_id = Some("b".to_string());
    let mut b = bean("b");
    b.parent_id = Some("a".to_string());
    store.set(a);
    store.set(b);

    let ids: Vec<String> = store.descendants("a").into_iter().map(|b| b.id).collect();
    assert_eq!(ids, vec!["b"]);
}
