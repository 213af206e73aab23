//! In-memory task collection for a single goal.
//!
//! The store is loaded from a confirmed snapshot, queried by the resolver and
//! the ordering engine, and can apply a [`MutationIntent`] locally to produce
//! an optimistic preview. It never talks to persistence.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Task, TaskId};
use crate::sync::MutationIntent;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

/// Total display order: week, then `order`, then creation time, then id.
///
/// The last two keys keep the order stable when `order` values collide.
pub fn display_cmp(a: &Task, b: &Task) -> Ordering {
    a.week_number
        .cmp(&b.week_number)
        .then(a.order.cmp(&b.order))
        .then(a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

impl TaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn index(&self) -> HashMap<&str, &Task> {
        self.tasks.iter().map(|t| (t.id.as_str(), t)).collect()
    }

    /// Every task in display order.
    pub fn display_order(&self) -> Vec<&Task> {
        let mut ordered: Vec<&Task> = self.tasks.iter().collect();
        ordered.sort_by(|a, b| display_cmp(a, b));
        ordered
    }

    /// Tasks of one week bucket, in display order.
    pub fn bucket(&self, week_number: u32) -> Vec<&Task> {
        let mut bucket: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.week_number == week_number)
            .collect();
        bucket.sort_by(|a, b| display_cmp(a, b));
        bucket
    }

    pub fn max_order(&self, week_number: u32) -> Option<i64> {
        self.tasks
            .iter()
            .filter(|t| t.week_number == week_number)
            .map(|t| t.order)
            .max()
    }

    pub fn weeks(&self) -> BTreeSet<u32> {
        self.tasks.iter().map(|t| t.week_number).collect()
    }

    /// Tasks that list `id` among their dependencies.
    pub fn dependents_of(&self, id: &str) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.depends_on(id)).collect()
    }

    /// Apply an intent locally and return the resulting store.
    ///
    /// Used for optimistic previews only. Entries that reference unknown
    /// tasks are skipped; the adapter is the one that rejects them.
    pub fn apply(&self, intent: &MutationIntent, now: DateTime<Utc>) -> TaskStore {
        let mut next = self.clone();
        match intent {
            MutationIntent::CreateTasks { tasks } => {
                for task in tasks {
                    if !next.contains(&task.id) {
                        next.tasks.push(task.clone());
                    }
                }
            },
            MutationIntent::UpdateTask { id, changes } => {
                if let Some(task) = next.tasks.iter_mut().find(|t| &t.id == id) {
                    changes.apply_to(task);
                    task.updated_at = now;
                }
            },
            MutationIntent::DeleteTask { id } => {
                next.tasks.retain(|t| &t.id != id);
            },
            MutationIntent::Reorder(reorder) => {
                for entry in &reorder.entries {
                    if let Some(task) = next.tasks.iter_mut().find(|t| t.id == entry.task_id) {
                        task.order = entry.new_order;
                        task.week_number = entry.new_week_number;
                        task.updated_at = now;
                    }
                }
            },
        }
        next
    }

    /// Ids referenced as dependencies that no task in the store carries.
    pub fn dangling_dependencies(&self) -> Vec<(TaskId, TaskId)> {
        let index = self.index();
        let mut dangling = Vec::new();
        for task in &self.tasks {
            for dep in &task.dependencies {
                if !index.contains_key(dep.as_str()) {
                    dangling.push((task.id.clone(), dep.clone()));
                }
            }
        }
        dangling
    }
}
