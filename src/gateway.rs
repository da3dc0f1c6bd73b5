//! Mutation gateway — the write path to the remote store.
//!
//! Mutations never touch the local cache. A write is acknowledged by the
//! store and becomes visible only once the next snapshot arrives
//! (eventually consistent). In-flight mutations are not cancelled by engine
//! teardown; their results are simply discarded.

use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;

use crate::engine::TaskView;
use crate::error::SyncError;
use crate::model::{fields, Patch, TaskDraft, TaskPatch};
use crate::remote::{Document, DocumentStore, StoreError, Timestamp};

pub(crate) struct MutationGateway {
    collection: String,
    store: Arc<dyn DocumentStore>,
    identity_rx: watch::Receiver<Option<String>>,
    view_rx: watch::Receiver<TaskView>,
}

impl MutationGateway {
    pub(crate) fn new(
        collection: String,
        store: Arc<dyn DocumentStore>,
        identity_rx: watch::Receiver<Option<String>>,
        view_rx: watch::Receiver<TaskView>,
    ) -> Self {
        Self {
            collection,
            store,
            identity_rx,
            view_rx,
        }
    }

    /// Current identity, or `AuthRequired` — checked synchronously before any
    /// store call.
    fn require_identity(&self) -> Result<String, SyncError> {
        self.identity_rx
            .borrow()
            .clone()
            .ok_or(SyncError::AuthRequired)
    }

    /// Create a task owned by the current identity. Both timestamps are set
    /// to submission time. Returns the store-assigned id.
    pub(crate) async fn add(&self, draft: TaskDraft) -> Result<String, SyncError> {
        let owner = self.require_identity()?;
        let now = Timestamp::now();

        let mut doc = Document::new();
        doc.insert(fields::TITLE.into(), Value::String(draft.title));
        doc.insert(fields::DESCRIPTION.into(), Value::String(draft.description));
        doc.insert(
            fields::STATUS.into(),
            Value::String(draft.status.as_str().into()),
        );
        doc.insert(
            fields::DUE_DATE.into(),
            draft
                .due_date
                .map(|d| Timestamp::from(d).to_value())
                .unwrap_or(Value::Null),
        );
        doc.insert(fields::OWNER_ID.into(), Value::String(owner));
        doc.insert(fields::CREATED_AT.into(), now.to_value());
        doc.insert(fields::UPDATED_AT.into(), now.to_value());

        let id = self.store.create(&self.collection, doc).await?;
        Ok(id)
    }

    /// Merge the provided fields into an existing task. `updated_at` is
    /// refreshed regardless of which fields changed.
    pub(crate) async fn update(&self, id: &str, patch: TaskPatch) -> Result<(), SyncError> {
        self.require_identity()?;

        let mut doc = Document::new();
        if let Some(title) = patch.title {
            doc.insert(fields::TITLE.into(), Value::String(title));
        }
        if let Some(description) = patch.description {
            doc.insert(fields::DESCRIPTION.into(), Value::String(description));
        }
        if let Some(status) = patch.status {
            doc.insert(
                fields::STATUS.into(),
                Value::String(status.as_str().into()),
            );
        }
        match patch.due_date {
            Patch::Keep => {}
            Patch::Clear => {
                doc.insert(fields::DUE_DATE.into(), Value::Null);
            }
            Patch::Set(due) => {
                doc.insert(fields::DUE_DATE.into(), Timestamp::from(due).to_value());
            }
        }
        doc.insert(fields::UPDATED_AT.into(), Timestamp::now().to_value());

        self.store.update(&self.collection, id, doc).await?;
        Ok(())
    }

    /// Delete one task. Whether deleting an unknown id fails is store-defined.
    pub(crate) async fn delete(&self, id: &str) -> Result<(), SyncError> {
        self.require_identity()?;
        self.store.delete(&self.collection, id).await?;
        Ok(())
    }

    /// Flip a task's status, reading the current value from the local view.
    ///
    /// A task absent from the view is a silent no-op: no store call, no
    /// error. The view can lag the store, so a stale toggle is possible —
    /// known behavior, kept deliberately (see DESIGN.md).
    pub(crate) async fn toggle_status(&self, id: &str) -> Result<(), SyncError> {
        let status = self
            .view_rx
            .borrow()
            .tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.status);
        let Some(status) = status else {
            debug!(task_id = %id, "toggle requested for task not in local view, ignoring");
            return Ok(());
        };
        self.update(id, TaskPatch::new().status(status.toggled()))
            .await
    }

    /// Delete every task currently in the view. All deletes are launched
    /// concurrently (non-transactional); rejections are aggregated while
    /// completed deletes stand.
    pub(crate) async fn clear(&self) -> Result<(), SyncError> {
        self.require_identity()?;

        let ids: Vec<String> = self
            .view_rx
            .borrow()
            .tasks
            .iter()
            .map(|t| t.id.clone())
            .collect();

        let deletes = ids.into_iter().map(|id| {
            let store = Arc::clone(&self.store);
            let collection = self.collection.clone();
            async move {
                let result = store.delete(&collection, &id).await;
                (id, result)
            }
        });

        let failures: Vec<(String, StoreError)> = join_all(deletes)
            .await
            .into_iter()
            .filter_map(|(id, result)| result.err().map(|err| (id, err)))
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(SyncError::ClearFailed { failures })
        }
    }
}
