//! The Sync Adapter boundary.
//!
//! The core never persists anything itself. It emits [`MutationIntent`]s and
//! expects the adapter to commit each one atomically and hand back the
//! authoritative [`Snapshot`](crate::snapshot::Snapshot). Adapters must also
//! serialise mutations per goal so that at most one is in flight.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Task, TaskId, TaskStatus};
use crate::ordering::ReorderIntent;
use crate::snapshot::Snapshot;

/// Partial update of a task; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<TaskId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl TaskChanges {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskChanges::default()
    }

    /// Apply the set fields onto `task`.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(dependencies) = &self.dependencies {
            task.dependencies = dependencies.clone();
        }
        if let Some(week) = self.week_number {
            task.week_number = week;
        }
        if let Some(day) = self.day_number {
            task.day_number = Some(day);
        }
        if let Some(order) = self.order {
            task.order = order;
        }
    }
}

/// A single atomic mutation request against one goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MutationIntent {
    /// Insert one or more fully formed tasks. Generation uses a single batch.
    CreateTasks { tasks: Vec<Task> },
    UpdateTask { id: TaskId, changes: TaskChanges },
    DeleteTask { id: TaskId },
    Reorder(ReorderIntent),
}

impl MutationIntent {
    pub fn kind(&self) -> &'static str {
        match self {
            MutationIntent::CreateTasks { .. } => "create_tasks",
            MutationIntent::UpdateTask { .. } => "update_task",
            MutationIntent::DeleteTask { .. } => "delete_task",
            MutationIntent::Reorder(_) => "reorder",
        }
    }
}

/// Persistence collaborator for goal snapshots.
pub trait SyncAdapter: Send + Sync {
    /// Load the current confirmed snapshot for a goal.
    fn load_snapshot(&self, goal_id: &str) -> impl Future<Output = Result<Snapshot>> + Send;

    /// Commit `intent` atomically (all of it or nothing) and return the new
    /// confirmed snapshot.
    fn commit(
        &self,
        goal_id: &str,
        intent: &MutationIntent,
    ) -> impl Future<Output = Result<Snapshot>> + Send;
}
