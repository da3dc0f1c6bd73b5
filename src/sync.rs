//! Subscription manager — owns the lifecycle of the single live query.
//!
//! One spawned task per engine. It reacts to identity changes by tearing
//! down and re-opening the live query (at most one is ever active, and an
//! old one is always cancelled before a new one opens), feeds decoded
//! snapshots into the cache, and publishes the resulting view. Transport
//! errors degrade the view to empty/not-loading and are not retried — retry
//! is the store client's concern.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::cache::TaskCache;
use crate::decode::decode_snapshot;
use crate::engine::TaskView;
use crate::remote::{DocumentStore, SnapshotEvent, Subscription};

pub(crate) fn spawn(
    collection: String,
    store: Arc<dyn DocumentStore>,
    identity_rx: watch::Receiver<Option<String>>,
    view_tx: watch::Sender<TaskView>,
) -> JoinHandle<()> {
    tokio::spawn(run(collection, store, identity_rx, view_tx))
}

async fn run(
    collection: String,
    store: Arc<dyn DocumentStore>,
    mut identity_rx: watch::Receiver<Option<String>>,
    view_tx: watch::Sender<TaskView>,
) {
    let mut cache = TaskCache::new();
    let mut active: Option<Subscription> = None;

    // Evaluate whatever identity is present at startup before watching for
    // changes, so a store constructed after sign-in still subscribes.
    let initial = identity_rx.borrow_and_update().clone();
    apply_identity(
        initial,
        &collection,
        &store,
        &mut active,
        &mut cache,
        &view_tx,
    )
    .await;

    loop {
        tokio::select! {
            // Every view receiver is gone — the engine was dropped.
            _ = view_tx.closed() => break,

            changed = identity_rx.changed() => {
                if changed.is_err() {
                    // Identity provider dropped. Treat as a sign-out and stop.
                    teardown(&mut active, &mut cache, &view_tx);
                    break;
                }
                let next = identity_rx.borrow_and_update().clone();
                apply_identity(next, &collection, &store, &mut active, &mut cache, &view_tx)
                    .await;
            }

            event = next_from(&mut active) => match event {
                Some(SnapshotEvent::Snapshot(docs)) => {
                    let tasks = decode_snapshot(&docs);
                    debug!(delivered = docs.len(), decoded = tasks.len(), "applying snapshot");
                    cache.replace(tasks);
                    view_tx.send_replace(TaskView {
                        tasks: cache.snapshot(),
                        loading: false,
                    });
                }
                Some(SnapshotEvent::Error(err)) => {
                    error!(error = %err, "task subscription failed");
                    if let Some(sub) = active.take() {
                        sub.cancel();
                    }
                    cache.clear();
                    view_tx.send_replace(TaskView::empty(false));
                }
                None => {
                    warn!("task subscription stream ended");
                    active = None;
                    cache.clear();
                    view_tx.send_replace(TaskView::empty(false));
                }
            },
        }
    }
}

/// Resolves to the next event of the active subscription, or never if there
/// is none.
async fn next_from(active: &mut Option<Subscription>) -> Option<SnapshotEvent> {
    match active {
        Some(sub) => sub.next_event().await,
        None => std::future::pending().await,
    }
}

fn teardown(
    active: &mut Option<Subscription>,
    cache: &mut TaskCache,
    view_tx: &watch::Sender<TaskView>,
) {
    if let Some(sub) = active.take() {
        sub.cancel();
    }
    cache.clear();
    view_tx.send_replace(TaskView::empty(false));
}

async fn apply_identity(
    identity: Option<String>,
    collection: &str,
    store: &Arc<dyn DocumentStore>,
    active: &mut Option<Subscription>,
    cache: &mut TaskCache,
    view_tx: &watch::Sender<TaskView>,
) {
    // The previous subscription is always cancelled first; two live queries
    // must never overlap.
    if let Some(sub) = active.take() {
        sub.cancel();
    }
    cache.clear();

    match identity {
        Some(owner) => {
            view_tx.send_replace(TaskView::empty(true));
            match store.subscribe(collection, &owner).await {
                Ok(sub) => {
                    info!(owner = %owner, collection = %collection, "opened task subscription");
                    *active = Some(sub);
                }
                Err(err) => {
                    error!(owner = %owner, error = %err, "failed to open task subscription");
                    view_tx.send_replace(TaskView::empty(false));
                }
            }
        }
        None => {
            debug!("no identity, task view cleared");
            view_tx.send_replace(TaskView::empty(false));
        }
    }
}
