//! In-Memory Bean Store
//!
//! Single source of truth for the replica: a map from bean id to the complete
//! record as last received. Upserts are full replacements keyed by id; there
//! is no partial field merge, so the store never holds a partially-applied
//! bean.
//!
//! # Derived Views
//!
//! The query methods (`by_status`, `children`, `blocked_by`, ...) are pure
//! functions over current contents. Every call rematerializes a fresh
//! `Vec<Bean>` with no caching, trading O(n) per call for guaranteed
//! freshness — collections are expected to hold hundreds of beans, not
//! millions.
//!
//! Iteration order is meaningless to callers, but results are sorted by bean
//! id so a given store state always produces the same sequence.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::models::{Bean, BeanChangeEvent, ChangeType};

/// Effect of applying a change event, reported back so the engine can log and
/// notify observers. `Ignored` covers malformed events, unknown change kinds,
/// and deletes of absent ids — all deliberate no-ops.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Upserted(Bean),
    Removed { id: String },
    Ignored,
}

/// In-memory store of beans keyed by id.
#[derive(Debug, Default)]
pub struct BeanStore {
    beans: HashMap<String, Bean>,
}

impl BeanStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.beans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }

    /// Look up a bean by id.
    pub fn get(&self, id: &str) -> Option<&Bean> {
        self.beans.get(id)
    }

    /// Upsert by full replacement, keyed by the bean's own id.
    pub fn set(&mut self, bean: Bean) {
        self.beans.insert(bean.id.clone(), bean);
    }

    /// Remove a bean if present. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: &str) -> Option<Bean> {
        self.beans.remove(id)
    }

    /// Empty the store.
    pub fn clear(&mut self) {
        self.beans.clear();
    }

    /// Replace the full contents with a fresh snapshot in one step.
    pub fn replace_all(&mut self, beans: Vec<Bean>) {
        self.beans.clear();
        for bean in beans {
            self.set(bean);
        }
    }

    /// Apply one change event from the live feed.
    ///
    /// - `CREATED`/`UPDATED` with a payload upsert it, keyed by the payload's
    ///   own `id` — authoritative over the envelope `bean_id` if they diverge
    /// - `CREATED`/`UPDATED` without a payload are malformed and dropped
    /// - `DELETED` removes by the envelope `bean_id`; the payload is unused
    /// - unknown change kinds are dropped
    pub fn apply(&mut self, event: BeanChangeEvent) -> ApplyOutcome {
        match event.change_type {
            ChangeType::Created | ChangeType::Updated => match event.bean {
                Some(bean) => {
                    self.set(bean.clone());
                    ApplyOutcome::Upserted(bean)
                }
                None => ApplyOutcome::Ignored,
            },
            ChangeType::Deleted => match self.remove(&event.bean_id) {
                Some(bean) => ApplyOutcome::Removed { id: bean.id },
                None => ApplyOutcome::Ignored,
            },
            ChangeType::Unknown => ApplyOutcome::Ignored,
        }
    }

    // ========================================================================
    // Derived views
    // ========================================================================

    /// Every bean, sorted by id.
    pub fn all(&self) -> Vec<Bean> {
        self.filter(|_| true)
    }

    /// Beans with exactly the given status.
    pub fn by_status(&self, status: &str) -> Vec<Bean> {
        self.filter(|b| b.status == status)
    }

    /// Beans with exactly the given type.
    pub fn by_type(&self, bean_type: &str) -> Vec<Bean> {
        self.filter(|b| b.bean_type == bean_type)
    }

    /// Beans carrying the given tag.
    pub fn by_tag(&self, tag: &str) -> Vec<Bean> {
        self.filter(|b| b.has_tag(tag))
    }

    /// Direct children of the given bean.
    pub fn children(&self, parent_id: &str) -> Vec<Bean> {
        self.filter(|b| b.parent_id.as_deref() == Some(parent_id))
    }

    /// Beans without a parent.
    pub fn roots(&self) -> Vec<Bean> {
        self.filter(Bean::is_root)
    }

    /// Beans whose blocking set contains `id` — the beans that `id` blocks.
    pub fn blocked_by(&self, id: &str) -> Vec<Bean> {
        self.filter(|b| b.is_blocked_by(id))
    }

    /// The beans named by `id`'s own blocking set — the beans that block `id`.
    ///
    /// Dangling references (blockers not present in the store) are skipped,
    /// as are duplicates in the blocking list.
    pub fn blockers_of(&self, id: &str) -> Vec<Bean> {
        let Some(bean) = self.beans.get(id) else {
            return Vec::new();
        };
        let mut result: Vec<Bean> = bean
            .blocking_ids
            .iter()
            .filter_map(|dep| self.beans.get(dep))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        result.dedup_by(|a, b| a.id == b.id);
        result
    }

    /// Transitive children of the given bean, breadth-first.
    ///
    /// The parent links form a forest in well-formed data but cycles are not
    /// prevented upstream; a visited set keeps the walk terminating either
    /// way.
    pub fn descendants(&self, id: &str) -> Vec<Bean> {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(id);

        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(id);

        let mut result = Vec::new();
        while let Some(current) = queue.pop_front() {
            for bean in self.beans.values() {
                if bean.parent_id.as_deref() == Some(current) && visited.insert(&bean.id) {
                    queue.push_back(&bean.id);
                    result.push(bean.clone());
                }
            }
        }

        result.sort_by(|a, b| a.id.cmp(&b.id));
        result
    }

    fn filter(&self, pred: impl Fn(&Bean) -> bool) -> Vec<Bean> {
        let mut result: Vec<Bean> = self.beans.values().filter(|b| pred(b)).cloned().collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        result
    }
}

#[cfg(test)]
mod store_test;
