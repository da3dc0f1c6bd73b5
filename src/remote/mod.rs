//! Remote document-store collaborator interface.
//!
//! The engine never talks to a concrete backend directly; everything goes
//! through [`DocumentStore`]. Reads arrive as pushed full-result-set
//! snapshots on a [`Subscription`]; writes are independent async calls that
//! become visible only through the next snapshot.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Raw document payload: field name → JSON value.
pub type Document = serde_json::Map<String, Value>;

// ─── Timestamp ───────────────────────────────────────────────────────────────

/// The store's wire representation of an absolute instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl Timestamp {
    pub fn now() -> Self {
        Utc::now().into()
    }

    /// Convert to a [`DateTime`]. Returns `None` for out-of-range values.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.seconds, self.nanos).single()
    }

    /// The JSON form stored in a document field.
    pub fn to_value(self) -> Value {
        serde_json::json!({ "seconds": self.seconds, "nanos": self.nanos })
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos(),
        }
    }
}

// ─── Documents & snapshots ───────────────────────────────────────────────────

/// One raw document as delivered by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    /// Store-assigned document id.
    pub id: String,
    pub fields: Document,
}

/// One event on a live-query subscription.
///
/// The original callback pair (snapshot handler + error handler) is modeled
/// as a single ordered stream so a snapshot and an error can never be
/// observed out of order.
#[derive(Debug, Clone)]
pub enum SnapshotEvent {
    /// The complete authoritative result set at one point in time.
    Snapshot(Vec<RawDocument>),
    /// Transport-level subscription failure. Delivery may stop after this.
    Error(StoreError),
}

// ─── Subscription ────────────────────────────────────────────────────────────

/// Handle to one live query. Dropping it (or calling [`Subscription::cancel`])
/// stops delivery; the store prunes the subscriber on its next push.
pub struct Subscription {
    events: mpsc::Receiver<SnapshotEvent>,
}

impl Subscription {
    pub fn new(events: mpsc::Receiver<SnapshotEvent>) -> Self {
        Self { events }
    }

    /// Next pushed event, or `None` once the store has closed the stream.
    pub async fn next_event(&mut self) -> Option<SnapshotEvent> {
        self.events.recv().await
    }

    /// Explicit unsubscribe. Closes the channel so the store stops delivering.
    pub fn cancel(mut self) {
        self.events.close();
    }

    /// Consume the subscription as a [`futures_util::Stream`] of events.
    pub fn into_stream(self) -> ReceiverStream<SnapshotEvent> {
        ReceiverStream::new(self.events)
    }
}

// ─── DocumentStore ───────────────────────────────────────────────────────────

/// Async document-store collaborator.
///
/// Retry, backoff, and offline queueing are the implementation's concern —
/// the engine never retries on its own.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document and return its store-assigned id.
    async fn create(&self, collection: &str, doc: Document) -> Result<String, StoreError>;

    /// Merge `patch` into an existing document. A `null` field value is
    /// stored verbatim (the decoder reads it back as "absent").
    async fn update(&self, collection: &str, id: &str, patch: Document)
        -> Result<(), StoreError>;

    /// Delete a document. Whether deleting an unknown id fails is
    /// store-defined.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Open a live query over `collection` filtered to documents whose
    /// owner field equals `owner`. Every push delivers the full result set.
    async fn subscribe(&self, collection: &str, owner: &str) -> Result<Subscription, StoreError>;
}

// ─── StoreError ──────────────────────────────────────────────────────────────

/// Failure reported by the document store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

// ─── Tests ───────────────────────────────────────────────────────────────────
