//! Bean Replica Engine
//!
//! `BeanReplica` reconciles a one-shot snapshot fetch with the live change
//! feed and exposes a consistent read surface over the result. Callers drive
//! `load()` then `subscribe()`; `subscribe()` is idempotent and
//! `unsubscribe()` is safe to call repeatedly or when never subscribed. A
//! restart (`load()` then re-`subscribe()`) fully resynchronizes from any
//! state.
//!
//! # Failure Policy
//!
//! Failures never propagate to callers. A failed fetch lands in
//! `last_error`, a feed transport error flips the connectivity flag, and
//! malformed or unknown events are dropped. The replica never crashes and
//! never hands out a torn view.
//!
//! # Snapshot Replacement
//!
//! `load()` fetches first and swaps the store contents after, inside one
//! write-lock scope. A failed fetch therefore leaves the previous snapshot
//! intact instead of destroying it, and readers only ever observe the old
//! state or the complete new one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::client::{BeanClient, FeedMessage};
use crate::models::Bean;
use crate::services::events::ReplicaEvent;
use crate::store::{ApplyOutcome, BeanStore};

/// Broadcast channel capacity for replica observer events.
///
/// 128 provides headroom for burst applies (snapshot follow-ups, bulk edits
/// upstream) while limiting memory overhead. Lagging observers only miss
/// notifications; the store remains authoritative.
const REPLICA_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Clears the loading flag on every exit path, including early returns and
/// fetch failures.
struct LoadingGuard(Arc<AtomicBool>);

impl LoadingGuard {
    fn acquire(flag: Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Client-side live replica of the beans collection.
///
/// Explicitly constructed around an injected transport; hold as many
/// independent instances as needed (there is no global singleton).
pub struct BeanReplica {
    client: Arc<dyn BeanClient>,
    store: Arc<RwLock<BeanStore>>,
    loading: Arc<AtomicBool>,
    connected: Arc<AtomicBool>,
    last_error: RwLock<Option<String>>,
    feed_task: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<ReplicaEvent>,
}

impl BeanReplica {
    /// Create a replica over the given transport. The store starts empty;
    /// call [`load`](Self::load) to seed it and [`subscribe`](Self::subscribe)
    /// for live updates.
    pub fn new(client: Arc<dyn BeanClient>) -> Self {
        let (events, _) = broadcast::channel(REPLICA_EVENT_CHANNEL_CAPACITY);
        Self {
            client,
            store: Arc::new(RwLock::new(BeanStore::new())),
            loading: Arc::new(AtomicBool::new(false)),
            connected: Arc::new(AtomicBool::new(false)),
            last_error: RwLock::new(None),
            feed_task: Mutex::new(None),
            events,
        }
    }

    /// Subscribe to replica observer events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<ReplicaEvent> {
        self.events.subscribe()
    }

    /// Whether a snapshot load is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Whether the change feed has delivered events without a trailing error.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// The message of the most recent failed load, if any. Cleared when the
    /// next load starts.
    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    /// Fetch the full collection and replace the store contents.
    ///
    /// Never returns an error: a failed fetch records its message in
    /// [`last_error`](Self::last_error) and leaves the previous snapshot in
    /// place. The loading flag is set for the duration of the call and
    /// cleared on every exit path.
    pub async fn load(&self) {
        let _guard = LoadingGuard::acquire(Arc::clone(&self.loading));
        self.last_error.write().await.take();

        match self.client.fetch_beans().await {
            Ok(beans) => {
                let count = beans.len();
                self.store.write().await.replace_all(beans);
                info!(count, "bean snapshot loaded");
                let _ = self.events.send(ReplicaEvent::SnapshotReplaced { count });
            }
            Err(err) => {
                warn!(error = %err, "bean snapshot fetch failed; keeping previous contents");
                *self.last_error.write().await = Some(err.to_string());
            }
        }
    }

    /// Open the live change feed and start applying events.
    ///
    /// Idempotent: while a subscription handle exists, further calls are
    /// no-ops, so events are never applied twice. The handle is released only
    /// by [`unsubscribe`](Self::unsubscribe).
    pub async fn subscribe(&self) {
        let mut slot = self.feed_task.lock().await;
        if slot.is_some() {
            debug!("change feed already subscribed; ignoring");
            return;
        }

        let rx = self.client.subscribe_changes();
        let store = Arc::clone(&self.store);
        let connected = Arc::clone(&self.connected);
        let events = self.events.clone();
        *slot = Some(tokio::spawn(run_feed(rx, store, connected, events)));
        debug!("change feed subscription opened");
    }

    /// Tear down the live subscription if one exists. Safe to call when
    /// never subscribed and safe to call repeatedly.
    pub async fn unsubscribe(&self) {
        let mut slot = self.feed_task.lock().await;
        let Some(handle) = slot.take() else {
            return;
        };
        handle.abort();
        set_connected(&self.connected, &self.events, false);
        debug!("change feed subscription released");
    }

    // ========================================================================
    // Read surface — recomputed from the store on every call
    // ========================================================================

    /// Look up one bean by id.
    pub async fn get(&self, id: &str) -> Option<Bean> {
        self.store.read().await.get(id).cloned()
    }

    /// Number of beans currently in the replica.
    pub async fn count(&self) -> usize {
        self.store.read().await.len()
    }

    /// Every bean.
    pub async fn all(&self) -> Vec<Bean> {
        self.store.read().await.all()
    }

    /// Beans with exactly the given status.
    pub async fn by_status(&self, status: &str) -> Vec<Bean> {
        self.store.read().await.by_status(status)
    }

    /// Beans with exactly the given type.
    pub async fn by_type(&self, bean_type: &str) -> Vec<Bean> {
        self.store.read().await.by_type(bean_type)
    }

    /// Beans carrying the given tag.
    pub async fn by_tag(&self, tag: &str) -> Vec<Bean> {
        self.store.read().await.by_tag(tag)
    }

    /// Direct children of the given bean.
    pub async fn children(&self, parent_id: &str) -> Vec<Bean> {
        self.store.read().await.children(parent_id)
    }

    /// Beans without a parent.
    pub async fn roots(&self) -> Vec<Bean> {
        self.store.read().await.roots()
    }

    /// Beans whose blocking set contains `id` — the beans that `id` blocks.
    pub async fn blocked_by(&self, id: &str) -> Vec<Bean> {
        self.store.read().await.blocked_by(id)
    }

    /// The beans that block `id`, dangling references skipped.
    pub async fn blockers_of(&self, id: &str) -> Vec<Bean> {
        self.store.read().await.blockers_of(id)
    }

    /// Transitive children of the given bean, cycle-tolerant.
    pub async fn descendants(&self, id: &str) -> Vec<Bean> {
        self.store.read().await.descendants(id)
    }
}

impl Drop for BeanReplica {
    // Ownership of the feed connection is exclusive to the replica; dropping
    // the replica must not leak a running feed task.
    fn drop(&mut self) {
        if let Ok(mut slot) = self.feed_task.try_lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

/// Flip the connectivity flag, notifying observers only on an actual change.
fn set_connected(flag: &AtomicBool, events: &broadcast::Sender<ReplicaEvent>, connected: bool) {
    if flag.swap(connected, Ordering::SeqCst) != connected {
        let _ = events.send(ReplicaEvent::ConnectionChanged { connected });
    }
}

/// Feed loop: applies messages in receipt order, one at a time.
async fn run_feed(
    mut rx: broadcast::Receiver<FeedMessage>,
    store: Arc<RwLock<BeanStore>>,
    connected: Arc<AtomicBool>,
    events: broadcast::Sender<ReplicaEvent>,
) {
    loop {
        match rx.recv().await {
            Ok(FeedMessage::Change(event)) => {
                set_connected(&connected, &events, true);
                let outcome = store.write().await.apply(event);
                match outcome {
                    ApplyOutcome::Upserted(bean) => {
                        debug!(id = %bean.id, "bean upserted from change feed");
                        let _ = events.send(ReplicaEvent::BeanUpserted(bean));
                    }
                    ApplyOutcome::Removed { id } => {
                        debug!(%id, "bean removed from change feed");
                        let _ = events.send(ReplicaEvent::BeanDeleted { id });
                    }
                    ApplyOutcome::Ignored => {
                        debug!("change event had no effect; ignoring");
                    }
                }
            }
            Ok(FeedMessage::Error(err)) => {
                // The subscription stays open; only an explicit unsubscribe
                // releases it. The feed may recover with the next event.
                error!(error = %err, "change feed transport error");
                set_connected(&connected, &events, false);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "change feed lagged; a fresh load() will resync");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("change feed closed by transport");
                set_connected(&connected, &events, false);
                break;
            }
        }
    }
}
