// SPDX-License-Identifier: MIT
//! Local ordered cache of decoded tasks.
//!
//! The cache is replaced wholesale on every snapshot — there is no merge
//! step, so correctness depends only on the store delivering the full result
//! set on every push. Total order: `created_at` descending (newest first),
//! ties broken by `id` ascending so the order is deterministic.

use std::sync::Arc;

use crate::model::Task;

#[derive(Debug, Default)]
pub struct TaskCache {
    tasks: Arc<[Task]>,
}

impl TaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire cached set with `tasks`, applying the total order.
    pub fn replace(&mut self, mut tasks: Vec<Task>) {
        tasks.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        self.tasks = tasks.into();
    }

    pub fn clear(&mut self) {
        self.tasks = Vec::new().into();
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Cheap shared snapshot of the current ordered list.
    pub fn snapshot(&self) -> Arc<[Task]> {
        Arc::clone(&self.tasks)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
