//! Goal-scoped facade over the core.
//!
//! A [`Planner`] holds the last confirmed snapshot of one goal. Each operation
//! validates its input against that snapshot, builds a [`MutationIntent`],
//! hands it to the [`SyncAdapter`] and adopts the confirmed snapshot that
//! comes back. Lock state and display order are always recomputed from the
//! current snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::analytics::ProgressReport;
use crate::dependencies::{find_cycles, resolve_locks, unsatisfied_dependencies};
use crate::error::{PlannerError, Result};
use crate::generate::{plan_generated_tasks, TitleSource};
use crate::models::{Goal, Task, TaskId, TaskStatus, TaskWithLock};
use crate::ordering::{self, Direction, MoveOutcome, MoveScope};
use crate::snapshot::{Reconciled, Snapshot, SnapshotTracker};
use crate::store::TaskStore;
use crate::sync::{MutationIntent, SyncAdapter, TaskChanges};
use crate::validation::{validate_day, validate_dependencies, validate_title, validate_week};
use crate::{log_error, log_task_operation};

/// Structured result of a planner operation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MutationOutcome {
    /// The adapter committed the intent at this revision.
    Applied { revision: u64 },
    /// A forced delete committed; these tasks now reference a missing id.
    Deleted { revision: u64, orphaned: Vec<TaskId> },
    /// An adjacent move had no neighbour in that direction.
    Boundary { task_id: TaskId, direction: Direction },
    /// The target was already gone; nothing was sent to the adapter.
    AlreadySatisfied { task_id: TaskId },
    /// The request matches the current state; nothing was sent.
    Unchanged { target: String },
}

impl MutationOutcome {
    pub fn revision(&self) -> Option<u64> {
        match self {
            MutationOutcome::Applied { revision } | MutationOutcome::Deleted { revision, .. } => {
                Some(*revision)
            },
            _ => None,
        }
    }
}

/// Fields for a manually added task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub week_number: u32,
    pub day_number: Option<u32>,
    pub description: Option<String>,
    pub dependencies: Vec<TaskId>,
}

/// One week bucket of the rendered task view.
#[derive(Debug, Clone, Serialize)]
pub struct WeekView {
    pub week_number: u32,
    pub tasks: Vec<TaskWithLock>,
}

pub struct Planner<A: SyncAdapter> {
    adapter: A,
    tracker: SnapshotTracker,
}

impl<A: SyncAdapter> Planner<A> {
    /// Load the current snapshot of `goal_id` from the adapter.
    pub async fn open(adapter: A, goal_id: &str) -> Result<Self> {
        let snapshot = adapter.load_snapshot(goal_id).await?;
        tracing::debug!(goal_id, revision = snapshot.revision, "Opened planner");
        Ok(Self {
            adapter,
            tracker: SnapshotTracker::new(snapshot),
        })
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.tracker.current()
    }

    pub fn goal(&self) -> &Goal {
        &self.snapshot().goal
    }

    pub fn store(&self) -> &TaskStore {
        &self.snapshot().tasks
    }

    pub fn task(&self, id: &str) -> Result<&Task> {
        self.store()
            .get(id)
            .ok_or_else(|| PlannerError::TaskNotFound(id.to_string()))
    }

    pub fn locks(&self) -> BTreeMap<TaskId, bool> {
        resolve_locks(self.store().tasks())
    }

    pub fn cycles(&self) -> Vec<Vec<TaskId>> {
        find_cycles(self.store().tasks())
    }

    /// Display-ordered tasks grouped by week, one entry per goal week.
    pub fn view(&self) -> Vec<WeekView> {
        let locks = self.locks();
        let store = self.store();
        let mut weeks: Vec<WeekView> = (1..=self.goal().duration_weeks)
            .map(|week_number| WeekView {
                week_number,
                tasks: Vec::new(),
            })
            .collect();

        for task in store.display_order() {
            let entry = TaskWithLock {
                task: task.clone(),
                is_locked: locks.get(&task.id).copied().unwrap_or(true),
            };
            match weeks.iter_mut().find(|w| w.week_number == task.week_number) {
                Some(week) => week.tasks.push(entry),
                None => weeks.push(WeekView {
                    week_number: task.week_number,
                    tasks: vec![entry],
                }),
            }
        }
        weeks
    }

    /// Optimistic local result of `intent`; the confirmed snapshot is untouched.
    pub fn preview(&self, intent: &MutationIntent) -> TaskStore {
        self.store().apply(intent, Utc::now())
    }

    pub fn progress(&self, today: NaiveDate) -> ProgressReport {
        ProgressReport::build(self.snapshot(), today)
    }

    /// Offer a snapshot obtained out of band (e.g. a reload).
    pub fn reconcile(&mut self, snapshot: Snapshot) -> Reconciled {
        self.tracker.offer(snapshot)
    }

    /// Reload from the adapter and adopt the result if it is newer.
    pub async fn refresh(&mut self) -> Result<Reconciled> {
        let goal_id = self.goal().id.clone();
        let snapshot = self.adapter.load_snapshot(&goal_id).await?;
        Ok(self.tracker.offer(snapshot))
    }

    async fn commit(&mut self, intent: MutationIntent) -> Result<u64> {
        let goal_id = self.goal().id.clone();
        match self.adapter.commit(&goal_id, &intent).await {
            Ok(snapshot) => {
                let revision = snapshot.revision;
                self.tracker.offer(snapshot);
                tracing::info!(goal_id = %goal_id, kind = intent.kind(), revision, "Committed mutation");
                Ok(revision)
            },
            Err(e) => {
                log_error!(e, intent.kind());
                Err(e)
            },
        }
    }

    /// Generate the goal's task plan in one atomic batch.
    ///
    /// Refused when the goal already has tasks.
    pub async fn generate(
        &mut self,
        source: &dyn TitleSource,
        now: DateTime<Utc>,
    ) -> Result<MutationOutcome> {
        if !self.store().is_empty() {
            return Err(PlannerError::validation(
                "tasks",
                format!("goal already has {} task(s)", self.store().len()),
            ));
        }
        let tasks = plan_generated_tasks(self.goal(), source, now)?;
        let count = tasks.len();
        let revision = self.commit(MutationIntent::CreateTasks { tasks }).await?;
        tracing::info!(goal_id = %self.goal().id, count, "Generated tasks");
        Ok(MutationOutcome::Applied { revision })
    }

    /// Append a task to the end of its week bucket.
    pub async fn add_task(
        &mut self,
        new: NewTask,
        now: DateTime<Utc>,
    ) -> Result<(TaskId, MutationOutcome)> {
        let title = validate_title(&new.title)?;
        validate_week(self.goal(), new.week_number)?;
        if let Some(day) = new.day_number {
            validate_day(day)?;
        }

        let mut task = Task::new(&self.goal().id, new.week_number, &title, now);
        task.day_number = new.day_number;
        task.description = new.description.filter(|d| !d.trim().is_empty());
        task.dependencies = validate_dependencies(self.store().tasks(), &task.id, &new.dependencies)?;
        task.order = ordering::insert_order(self.store(), new.week_number);

        let id = task.id.clone();
        let revision = self
            .commit(MutationIntent::CreateTasks { tasks: vec![task] })
            .await?;
        log_task_operation!("add", id.as_str());
        Ok((id, MutationOutcome::Applied { revision }))
    }

    /// Edit a task. Every set field is validated before anything is sent.
    pub async fn update_task(&mut self, id: &str, mut changes: TaskChanges) -> Result<MutationOutcome> {
        self.task(id)?;
        if let Some(title) = &changes.title {
            changes.title = Some(validate_title(title)?);
        }
        if let Some(week) = changes.week_number {
            validate_week(self.goal(), week)?;
        }
        if let Some(day) = changes.day_number {
            validate_day(day)?;
        }
        if let Some(deps) = &changes.dependencies {
            changes.dependencies = Some(validate_dependencies(self.store().tasks(), id, deps)?);
        }
        if let Some(status) = changes.status {
            self.check_transition(id, status)?;
        }

        let task = self.task(id)?;
        let mut edited = task.clone();
        changes.apply_to(&mut edited);
        if changes.is_empty() || edited == *task {
            return Ok(MutationOutcome::Unchanged {
                target: id.to_string(),
            });
        }

        let revision = self
            .commit(MutationIntent::UpdateTask {
                id: id.to_string(),
                changes,
            })
            .await?;
        log_task_operation!("update", id);
        Ok(MutationOutcome::Applied { revision })
    }

    pub async fn set_status(&mut self, id: &str, status: TaskStatus) -> Result<MutationOutcome> {
        self.update_task(id, TaskChanges::status(status)).await
    }

    pub async fn mark_complete(&mut self, id: &str) -> Result<MutationOutcome> {
        self.set_status(id, TaskStatus::Completed).await
    }

    /// A locked task can be reset but not started or completed.
    fn check_transition(&self, id: &str, status: TaskStatus) -> Result<()> {
        if status == TaskStatus::NotStarted {
            return Ok(());
        }
        let task = self.task(id)?;
        let blockers = unsatisfied_dependencies(task, self.store().tasks());
        if blockers.is_empty() {
            return Ok(());
        }
        let ids: Vec<&str> = blockers.iter().map(|b| b.id()).collect();
        Err(PlannerError::validation(
            "status",
            format!("task is locked until these complete: {}", ids.join(", ")),
        ))
    }

    /// Delete a task.
    ///
    /// Tasks other tasks depend on are only removed with `force`; their
    /// dependents then stay locked on the missing id. Deleting a task that is
    /// already gone reconciles to `AlreadySatisfied`.
    pub async fn delete_task(&mut self, id: &str, force: bool) -> Result<MutationOutcome> {
        if !self.store().contains(id) {
            tracing::warn!(task_id = id, "Delete of missing task treated as satisfied");
            return Ok(MutationOutcome::AlreadySatisfied {
                task_id: id.to_string(),
            });
        }

        let dependents: Vec<TaskId> = self
            .store()
            .dependents_of(id)
            .into_iter()
            .map(|t| t.id.clone())
            .collect();
        if !dependents.is_empty() && !force {
            return Err(PlannerError::DependencyConflict {
                task_id: id.to_string(),
                dependents,
            });
        }

        let revision = self
            .commit(MutationIntent::DeleteTask { id: id.to_string() })
            .await?;
        log_task_operation!("delete", id);
        if dependents.is_empty() {
            Ok(MutationOutcome::Applied { revision })
        } else {
            tracing::warn!(task_id = id, orphaned = dependents.len(), "Forced delete left dangling dependencies");
            Ok(MutationOutcome::Deleted {
                revision,
                orphaned: dependents,
            })
        }
    }

    pub async fn move_adjacent(
        &mut self,
        id: &str,
        direction: Direction,
        scope: MoveScope,
    ) -> Result<MutationOutcome> {
        let outcome = ordering::move_adjacent(self.store(), id, direction, scope)?;
        self.apply_move(outcome).await
    }

    pub async fn relocate_to_week(&mut self, id: &str, week: u32) -> Result<MutationOutcome> {
        let outcome = ordering::relocate_to_week(self.store(), self.goal(), id, week)?;
        self.apply_move(outcome).await
    }

    /// Renumber a week bucket densely; a no-op when it already is.
    pub async fn normalize_week(&mut self, week: u32) -> Result<MutationOutcome> {
        validate_week(self.goal(), week)?;
        let intent = ordering::normalize_bucket(self.store(), &self.goal().id, week);
        if intent.is_empty() {
            return Ok(MutationOutcome::Unchanged {
                target: format!("week {}", week),
            });
        }
        let revision = self.commit(MutationIntent::Reorder(intent)).await?;
        Ok(MutationOutcome::Applied { revision })
    }

    async fn apply_move(&mut self, outcome: MoveOutcome) -> Result<MutationOutcome> {
        match outcome {
            MoveOutcome::Moved(intent) => {
                let revision = self.commit(MutationIntent::Reorder(intent)).await?;
                Ok(MutationOutcome::Applied { revision })
            },
            MoveOutcome::Boundary { task_id, direction } => {
                Ok(MutationOutcome::Boundary { task_id, direction })
            },
            MoveOutcome::Unchanged { task_id } => Ok(MutationOutcome::Unchanged { target: task_id }),
        }
    }
}
