//! Bean Data Structure
//!
//! Defines the `Bean` record as served by the beans backend. The field set is
//! fixed and given by the server schema; this crate mirrors it verbatim and
//! performs no validation or migration on it.
//!
//! # Wire Contract
//!
//! Beans cross the transport boundary as camelCase JSON (`parentId`,
//! `blockingIds`, `createdAt`, and the `type` discriminator). The serde
//! attributes on [`Bean`] are that contract; the tests in `bean_test.rs`
//! enforce it.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A single bean: an issue/task-like record with hierarchy and blocking links.
///
/// # Fields
///
/// - `id`: opaque unique identifier, stable across the bean's lifetime
/// - `slug`: optional human-readable filename part
/// - `path`: path relative to the collection root (e.g. `epic-auth/abc123-login.md`)
/// - `status` / `bean_type` / `priority`: open-ended strings, not enumerated here
/// - `tags`: unordered; duplicates are kept as given by the source
/// - `created_at` / `updated_at`: opaque comparable strings (RFC 3339 on the wire)
/// - `parent_id`: self-referential forest link; cycles are not prevented and
///   read operations tolerate them
/// - `blocking_ids`: beans this bean depends on
///
/// Parent and blocking references are foreign references and may name beans
/// that are not present in the store (deleted, not yet loaded). Lookups treat
/// absence as "no match", never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bean {
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub path: String,
    pub title: String,
    pub status: String,
    #[serde(rename = "type")]
    pub bean_type: String,
    pub priority: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    pub body: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub blocking_ids: Vec<String>,
}

impl Bean {
    /// Create a bean with freshly stamped RFC 3339 timestamps.
    ///
    /// Real beans arrive fully formed from the server; this constructor exists
    /// for fixtures and local scaffolding.
    pub fn new(
        id: impl Into<String>,
        bean_type: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let now = Utc::now().to_rfc3339();
        Self {
            path: format!("{id}.md"),
            id,
            slug: None,
            title: title.into(),
            status: "todo".to_string(),
            bean_type: bean_type.into(),
            priority: "normal".to_string(),
            tags: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
            body: String::new(),
            parent_id: None,
            blocking_ids: Vec::new(),
        }
    }

    /// Whether this bean carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether this bean depends on (is blocked by) the bean with `id`.
    pub fn is_blocked_by(&self, id: &str) -> bool {
        self.blocking_ids.iter().any(|b| b == id)
    }

    /// Whether this bean has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
