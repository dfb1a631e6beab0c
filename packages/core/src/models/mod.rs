//! Data Models
//!
//! This module contains the data structures mirrored from the beans backend:
//!
//! - `Bean` - the tracked record (issue/task with hierarchy and blocking links)
//! - `BeanChangeEvent` / `ChangeType` - incremental change notifications
//!
//! All types follow the camelCase wire contract of the backend schema.

mod bean;
mod change;


pub use bean::Bean;
pub use change::{BeanChangeEvent, ChangeType};
