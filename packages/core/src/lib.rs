//! Beanmirror Core Replica Engine
//!
//! This crate maintains a client-side, continuously-consistent replica of the
//! server-owned beans collection (task/issue-like records with hierarchy and
//! blocking relations).
//!
//! # Architecture
//!
//! - **Snapshot + stream reconciliation**: a one-shot bulk fetch seeds the
//!   store, then an unbounded stream of change events is applied on top
//! - **Absorb-at-the-boundary failures**: fetch and feed errors become
//!   observable state (`last_error`, connectivity flag), never panics or
//!   error returns ("never crash the replica")
//! - **Explicit observers**: store mutations are announced on a broadcast
//!   channel; no implicit dependency tracking
//!
//! # Modules
//!
//! - [`models`] - Data structures (Bean, change events)
//! - [`store`] - In-memory bean store and derived view queries
//! - [`client`] - Transport capability seam (fetch + change feed)
//! - [`services`] - The replica engine and its observer events

pub mod client;
pub mod models;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use client::*;
pub use models::*;
pub use services::*;
pub use store::*;
