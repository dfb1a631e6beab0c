//! Change Events
//!
//! Incremental change notifications pushed by the backend over the live feed.
//!
//! # Event Flow
//!
//! 1. The backend mutates a bean (create, update, delete)
//! 2. A `BeanChangeEvent` is pushed to every live subscriber
//! 3. The replica engine applies each event to its store in receipt order
//!
//! Events are applied one at a time with no batching or reordering; per-event
//! application is indivisible, and there is no cross-event atomicity.

use crate::models::Bean;
use serde::{Deserialize, Serialize};

/// Kind of change carried by a feed event.
///
/// `Unknown` absorbs wire tags this client does not recognize, so a newer
/// server can introduce change kinds without breaking older replicas; the
/// engine ignores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Created,
    Updated,
    Deleted,
    #[serde(other)]
    Unknown,
}

/// One incremental change from the live feed.
///
/// `bean` carries the full record for `CREATED`/`UPDATED` and may be absent
/// for `DELETED` (the envelope `bean_id` alone identifies the removal).
/// A missing payload where one is required marks the event malformed; the
/// engine drops it without touching the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeanChangeEvent {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub bean_id: String,
    #[serde(default)]
    pub bean: Option<Bean>,
}

impl BeanChangeEvent {
    /// Event announcing a newly created bean.
    pub fn created(bean: Bean) -> Self {
        Self {
            change_type: ChangeType::Created,
            bean_id: bean.id.clone(),
            bean: Some(bean),
        }
    }

    /// Event announcing a full replacement of an existing bean.
    pub fn updated(bean: Bean) -> Self {
        Self {
            change_type: ChangeType::Updated,
            bean_id: bean.id.clone(),
            bean: Some(bean),
        }
    }

    /// Event announcing a removal. The deleted record itself is not carried.
    pub fn deleted(bean_id: impl Into<String>) -> Self {
        Self {
            change_type: ChangeType::Deleted,
            bean_id: bean_id.into(),
            bean: None,
        }
    }
}
