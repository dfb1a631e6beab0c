//! Replica Observer Events
//!
//! This module defines the events `BeanReplica` emits after mutating its
//! store. They follow the observer pattern over a tokio broadcast channel:
//! callers that want change notifications subscribe explicitly, and callers
//! that prefer polling simply ignore the channel. There is no implicit
//! framework-level dependency tracking.
//!
//! Observers that lag only miss notifications; the store itself is always
//! authoritative and can be re-read at any time.

use crate::models::Bean;

/// Notification emitted by the replica after a store mutation or a
/// connectivity change.
#[derive(Debug, Clone)]
pub enum ReplicaEvent {
    /// A snapshot load replaced the full store contents.
    SnapshotReplaced { count: usize },

    /// A change event inserted or fully replaced one bean.
    BeanUpserted(Bean),

    /// A change event removed one bean.
    BeanDeleted { id: String },

    /// Feed connectivity flipped.
    ConnectionChanged { connected: bool },
}

impl ReplicaEvent {
    /// String tag for logging and debugging.
    pub fn event_type(&self) -> &str {
        match self {
            ReplicaEvent::SnapshotReplaced { .. } => "snapshot:replaced",
            ReplicaEvent::BeanUpserted(_) => "bean:upserted",
            ReplicaEvent::BeanDeleted { .. } => "bean:deleted",
            ReplicaEvent::ConnectionChanged { .. } => "connection:changed",
        }
    }
}
