// SPDX-License-Identifier: MIT
//! In-memory [`DocumentStore`] with full push-snapshot delivery.
//!
//! Reference implementation of the store contract: uuid-assigned ids,
//! null-stored-verbatim merges, and a complete filtered snapshot pushed to
//! every live subscription after each mutation (plus one initial snapshot on
//! subscribe). Doubles as the fixture the integration tests run against, so
//! it also carries fault-injection hooks.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tracing::warn;
use uuid::Uuid;

use super::{Document, DocumentStore, RawDocument, SnapshotEvent, StoreError, Subscription};
use crate::model::fields;

/// Per-subscription event buffer. Pushes to a full buffer are dropped with a
/// warning rather than blocking the mutating caller.
const EVENT_BUFFER: usize = 64;

pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    /// collection name → (document id → fields). BTreeMap keeps snapshot
    /// iteration deterministic.
    collections: HashMap<String, BTreeMap<String, Document>>,
    subscribers: Vec<Subscriber>,
    /// Document ids whose next delete call is rejected (test fault injection).
    fail_deletes: HashSet<String>,
    delete_calls: usize,
    update_calls: usize,
}

struct Subscriber {
    collection: String,
    owner: String,
    tx: mpsc::Sender<SnapshotEvent>,
}

fn owner_matches(doc: &Document, owner: &str) -> bool {
    matches!(doc.get(fields::OWNER_ID), Some(Value::String(o)) if o == owner)
}

fn snapshot_of(
    collections: &HashMap<String, BTreeMap<String, Document>>,
    collection: &str,
    owner: &str,
) -> Vec<RawDocument> {
    collections
        .get(collection)
        .map(|docs| {
            docs.iter()
                .filter(|(_, doc)| owner_matches(doc, owner))
                .map(|(id, doc)| RawDocument {
                    id: id.clone(),
                    fields: doc.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}

impl Inner {
    /// Push the current filtered result set to every live subscriber of
    /// `collection`, pruning subscribers whose channel has closed.
    fn push(&mut self, collection: &str) {
        let mut dead = Vec::new();
        for (idx, sub) in self.subscribers.iter().enumerate() {
            if sub.collection != collection {
                continue;
            }
            let snapshot = snapshot_of(&self.collections, collection, &sub.owner);
            match sub.tx.try_send(SnapshotEvent::Snapshot(snapshot)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Closed(_)) => dead.push(idx),
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(
                        collection = %collection,
                        owner = %sub.owner,
                        "subscriber event buffer full, dropping snapshot push"
                    );
                }
            }
        }
        for idx in dead.into_iter().rev() {
            self.subscribers.remove(idx);
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Reject the next `delete` call for `id` with [`StoreError::Unavailable`].
    pub async fn fail_next_delete(&self, id: &str) {
        self.inner.lock().await.fail_deletes.insert(id.to_string());
    }

    /// Deliver a transport error to every subscriber matching
    /// `collection`/`owner`.
    pub async fn emit_error(&self, collection: &str, owner: &str, err: StoreError) {
        let inner = self.inner.lock().await;
        for sub in &inner.subscribers {
            if sub.collection == collection && sub.owner == owner {
                let _ = sub.tx.try_send(SnapshotEvent::Error(err.clone()));
            }
        }
    }

    /// Total number of `delete` calls received (including rejected ones).
    pub async fn delete_calls(&self) -> usize {
        self.inner.lock().await.delete_calls
    }

    /// Total number of `update` calls received.
    pub async fn update_calls(&self) -> usize {
        self.inner.lock().await.update_calls
    }

    pub async fn document_count(&self, collection: &str) -> usize {
        self.inner
            .lock()
            .await
            .collections
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Live (non-pruned) subscriber count, across all collections.
    pub async fn subscriber_count(&self) -> usize {
        self.inner.lock().await.subscribers.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, doc: Document) -> Result<String, StoreError> {
        let mut inner = self.inner.lock().await;
        let id = Uuid::new_v4().to_string();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), doc);
        inner.push(collection);
        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.update_calls += 1;
        let doc = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        for (key, value) in patch {
            doc.insert(key, value);
        }
        inner.push(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.delete_calls += 1;
        if inner.fail_deletes.remove(id) {
            return Err(StoreError::Unavailable(format!(
                "delete rejected for {id}"
            )));
        }
        // Deleting an unknown id succeeds silently, as the real store does.
        if let Some(docs) = inner.collections.get_mut(collection) {
            docs.remove(id);
        }
        inner.push(collection);
        Ok(())
    }

    async fn subscribe(
        &self,
        collection: &str,
        owner: &str,
    ) -> Result<Subscription, StoreError> {
        let mut inner = self.inner.lock().await;
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let initial = snapshot_of(&inner.collections, collection, owner);
        // Freshly created buffer, cannot be full.
        let _ = tx.try_send(SnapshotEvent::Snapshot(initial));
        inner.subscribers.push(Subscriber {
            collection: collection.to_string(),
            owner: owner.to_string(),
            tx,
        });
        Ok(Subscription::new(rx))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
