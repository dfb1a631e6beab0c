//! Transport Capability Seam
//!
//! The replica consumes exactly two capabilities from a backend transport
//! collaborator: a one-shot snapshot fetch and a server-pushed change feed.
//! In production that collaborator is a GraphQL client (query + subscription);
//! here it is the [`BeanClient`] trait, which keeps wire formats and protocol
//! details out of this crate and lets tests inject a mock transport.
//!
//! # Feed Semantics
//!
//! The feed delivers [`FeedMessage`]s in order. Transport errors travel
//! in-band as [`FeedMessage::Error`]: the subscription itself stays open and
//! may recover, so the replica reports the error and keeps listening.
//! Reconnection policy belongs to the transport or the caller, never to this
//! crate.

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::models::{Bean, BeanChangeEvent};

/// Transport-level subscription failure, delivered in-band on the feed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The transport layer failed (socket dropped, protocol error, ...).
    #[error("change feed transport error: {0}")]
    Transport(String),

    /// The server reported an error on the subscription itself.
    #[error("change feed server error: {0}")]
    Server(String),
}

/// One message from the live change feed.
#[derive(Debug, Clone)]
pub enum FeedMessage {
    /// A well-formed change notification.
    Change(BeanChangeEvent),

    /// The transport hit an error; the subscription may still recover.
    Error(FeedError),
}

/// Capabilities the replica needs from the backend transport.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: the replica shares the client with
/// the spawned feed task.
#[async_trait]
pub trait BeanClient: Send + Sync {
    /// One-shot fetch of the full bean collection (the snapshot).
    ///
    /// # Errors
    ///
    /// Transport and server failures surface here; the replica absorbs them
    /// into its `last_error` state rather than propagating.
    async fn fetch_beans(&self) -> Result<Vec<Bean>>;

    /// Open a receiver on the server-pushed change feed.
    ///
    /// Each call returns an independent receiver. The replica holds at most
    /// one at a time and releases it only on explicit unsubscribe.
    fn subscribe_changes(&self) -> broadcast::Receiver<FeedMessage>;
}
