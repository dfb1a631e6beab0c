//! Replica Services
//!
//! - `BeanReplica` - the synchronization engine (snapshot load, change feed
//!   subscription lifecycle, read surface)
//! - `ReplicaEvent` - observer notifications emitted after store mutations

mod events;
mod replica_service;

pub use events::ReplicaEvent;
pub use replica_service::BeanReplica;
