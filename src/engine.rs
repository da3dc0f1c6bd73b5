// SPDX-License-Identifier: MIT
//! The task store read model.
//!
//! [`TaskStore`] composes the subscription manager and the mutation gateway
//! behind the surface consumers use: an ordered task list, a loading flag, a
//! change-notification channel, and the five mutation operations. It is an
//! explicit object constructed with injected collaborator handles — no
//! global state.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::error::SyncError;
use crate::gateway::MutationGateway;
use crate::identity::IdentityProvider;
use crate::model::{Task, TaskDraft, TaskPatch};
use crate::remote::DocumentStore;
use crate::sync;

/// The published read state: the ordered task list plus the loading flag.
///
/// `loading` is true from the moment a subscription opens until its first
/// event arrives; it is false whenever no identity is signed in.
#[derive(Debug, Clone)]
pub struct TaskView {
    pub tasks: Arc<[Task]>,
    pub loading: bool,
}

impl TaskView {
    pub(crate) fn empty(loading: bool) -> Self {
        Self {
            tasks: Vec::new().into(),
            loading,
        }
    }
}

/// Reactive task store bound to one identity signal and one document store.
///
/// Dropping the store (or calling [`TaskStore::shutdown`]) cancels the live
/// subscription immediately. Mutations already in flight are not cancelled;
/// their results are discarded.
pub struct TaskStore {
    view_rx: watch::Receiver<TaskView>,
    gateway: MutationGateway,
    sync_task: JoinHandle<()>,
}

impl TaskStore {
    pub fn new(
        config: EngineConfig,
        identity: &dyn IdentityProvider,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let identity_rx = identity.watch();
        // Start in the loading state iff someone is already signed in, so
        // consumers never observe a false "empty and settled" view before
        // the sync task's first pass.
        let initial = TaskView::empty(identity_rx.borrow().is_some());
        let (view_tx, view_rx) = watch::channel(initial);

        let sync_task = sync::spawn(
            config.collection.clone(),
            Arc::clone(&store),
            identity_rx.clone(),
            view_tx,
        );
        let gateway =
            MutationGateway::new(config.collection, store, identity_rx, view_rx.clone());

        Self {
            view_rx,
            gateway,
            sync_task,
        }
    }

    /// [`TaskStore::new`] with the default [`EngineConfig`].
    pub fn with_defaults(identity: &dyn IdentityProvider, store: Arc<dyn DocumentStore>) -> Self {
        Self::new(EngineConfig::default(), identity, store)
    }

    // ─── Read surface ─────────────────────────────────────────────────────────

    /// Current ordered task list (a point-in-time snapshot).
    pub fn tasks(&self) -> Vec<Task> {
        self.view_rx.borrow().tasks.to_vec()
    }

    pub fn loading(&self) -> bool {
        self.view_rx.borrow().loading
    }

    /// Change-notification channel carrying the full view on every change.
    pub fn watch(&self) -> watch::Receiver<TaskView> {
        self.view_rx.clone()
    }

    // ─── Mutations ────────────────────────────────────────────────────────────

    /// Create a task owned by the current identity; returns the new id.
    /// The task becomes visible once the next snapshot arrives.
    pub async fn add_task(&self, draft: TaskDraft) -> Result<String, SyncError> {
        self.gateway.add(draft).await
    }

    /// Merge the provided fields into an existing task.
    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<(), SyncError> {
        self.gateway.update(id, patch).await
    }

    /// Delete one task.
    pub async fn delete_task(&self, id: &str) -> Result<(), SyncError> {
        self.gateway.delete(id).await
    }

    /// Flip a task's status based on the locally cached value.
    pub async fn toggle_task_status(&self, id: &str) -> Result<(), SyncError> {
        self.gateway.toggle_status(id).await
    }

    /// Delete every visible task, in parallel and non-transactionally.
    pub async fn clear_tasks(&self) -> Result<(), SyncError> {
        self.gateway.clear().await
    }

    // ─── Lifecycle ────────────────────────────────────────────────────────────

    /// Cancel the live subscription and stop the sync task.
    pub fn shutdown(&self) {
        self.sync_task.abort();
    }
}

impl Drop for TaskStore {
    fn drop(&mut self) {
        self.sync_task.abort();
    }
}
