//! tasksync — reactive task-synchronization engine.
//!
//! Keeps a per-identity, ordered, in-memory view of task entities consistent
//! with a remote document store through a push-based subscription, and
//! exposes asynchronous create/update/delete/toggle/clear operations.
//!
//! Data flow: identity change → the subscription manager opens/closes a live
//! query → the store pushes snapshots → [`decode`] → [`cache`] → the
//! published [`TaskView`] notifies consumers. Mutations go straight from
//! [`TaskStore`] through the mutation gateway to the store; the view only
//! reflects them once the next snapshot arrives (eventually consistent
//! writes).
//!
//! ```no_run
//! use std::sync::Arc;
//! use tasksync::{AuthHandle, MemoryStore, TaskDraft, TaskStore};
//!
//! # async fn demo() -> Result<(), tasksync::SyncError> {
//! let auth = AuthHandle::signed_in("user-1");
//! let engine = TaskStore::with_defaults(&auth, Arc::new(MemoryStore::new()));
//!
//! engine.add_task(TaskDraft::new("water the plants")).await?;
//! // ...the task appears in engine.tasks() once the store pushes a snapshot.
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub(crate) mod gateway;
pub mod identity;
pub mod model;
pub mod remote;
pub(crate) mod sync;
pub mod telemetry;

pub use config::EngineConfig;
pub use decode::DecodeError;
pub use engine::{TaskStore, TaskView};
pub use error::SyncError;
pub use identity::{AuthHandle, IdentityProvider};
pub use model::{Patch, Task, TaskDraft, TaskPatch, TaskStatus};
pub use remote::memory::MemoryStore;
pub use remote::{DocumentStore, RawDocument, SnapshotEvent, StoreError, Subscription, Timestamp};
