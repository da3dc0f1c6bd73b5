//! Task data model and mutation input types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire field names used in raw store documents.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const DUE_DATE: &str = "dueDate";
    pub const STATUS: &str = "status";
    pub const OWNER_ID: &str = "ownerId";
    pub const CREATED_AT: &str = "createdAt";
    pub const UPDATED_AT: &str = "updatedAt";
}

// ─── TaskStatus ──────────────────────────────────────────────────────────────

/// Completion state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Open,
    Complete,
}

impl TaskStatus {
    /// The opposite status.
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Open => TaskStatus::Complete,
            TaskStatus::Complete => TaskStatus::Open,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::Complete => "complete",
        }
    }

    /// Parse a wire status string. Returns `None` for unrecognized values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(TaskStatus::Open),
            "complete" => Some(TaskStatus::Complete),
            _ => None,
        }
    }
}

// ─── Task ────────────────────────────────────────────────────────────────────

/// A single task record as seen through the read model.
///
/// `id`, `owner_id`, and `created_at` are immutable once the store has
/// assigned them; `updated_at` is refreshed on every mutation and never
/// precedes `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned document id, unique within the owner's scope.
    pub id: String,
    pub title: String,
    pub description: String,
    /// `None` means "no due date".
    pub due_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    /// Opaque identity reference of the owning user.
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─── Mutation inputs ─────────────────────────────────────────────────────────

/// Input to `add_task` — everything except the fields the engine stamps
/// (id, owner, timestamps).
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Three-valued patch field: leave unchanged, clear to absent, or set a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field is not part of the patch; the stored value is untouched.
    Keep,
    /// Explicitly clear the stored value.
    Clear,
    /// Replace the stored value.
    Set(T),
}

// Not derived: the derive would bound `T: Default`.
impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

/// Partial update input to `update_task`.
///
/// Fields set to `None` (or `Patch::Keep` for the due date) are omitted from
/// the submitted document, so the store leaves them unchanged.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Patch<DateTime<Utc>>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Patch::Set(due);
        self
    }

    pub fn clear_due_date(mut self) -> Self {
        self.due_date = Patch::Clear;
        self
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
