//! SQLite implementation of the sync adapter.
//!
//! Every intent runs in a single transaction and bumps the goal's revision.
//! Mutations are serialised per goal through an async mutex, so at most one
//! is in flight for a given goal at any time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::db::models::{DailyLogRow, GoalRow, TaskRow};
use crate::error::{PlannerError, Result};
use crate::models::{DailyLogEntry, Goal, Intensity, Priority, Task};
use crate::snapshot::Snapshot;
use crate::store::TaskStore;
use crate::sync::{MutationIntent, SyncAdapter};
use crate::validation::{validate_duration, validate_log_values, validate_title};
use crate::log_goal_operation;

const TASK_COLUMNS: &str = "id, goal_id, week_number, day_number, title, description, status, \
                            dependencies, sort_order, created_at, updated_at";

/// Editable goal fields; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct GoalChanges {
    pub title: Option<String>,
    pub duration_weeks: Option<u32>,
    pub priority: Option<Priority>,
    pub intensity: Option<Intensity>,
}

pub struct SqliteAdapter {
    pool: SqlitePool,
    goal_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SqliteAdapter {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            goal_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn goal_lock(&self, goal_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .goal_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(goal_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn forget_goal_lock(&self, goal_id: &str) {
        self.goal_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(goal_id);
    }

    // ── Goals ───────────────────────────────────────────────────────

    pub async fn create_goal(&self, goal: &Goal) -> Result<Snapshot> {
        validate_title(&goal.title)?;
        validate_duration(goal.duration_weeks)?;

        sqlx::query(
            r#"
            INSERT INTO goals (id, title, duration_weeks, priority, intensity,
                               start_date, end_date, created_at, revision)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&goal.id)
        .bind(&goal.title)
        .bind(i64::from(goal.duration_weeks))
        .bind(goal.priority.as_str())
        .bind(goal.intensity.as_str())
        .bind(goal.start_date)
        .bind(goal.end_date)
        .bind(goal.created_at)
        .execute(&self.pool)
        .await?;

        log_goal_operation!("create", goal.id.as_str());
        self.snapshot(&goal.id).await
    }

    pub async fn get_goal(&self, goal_id: &str) -> Result<Goal> {
        Ok(self.goal_with_revision(goal_id).await?.0)
    }

    async fn goal_with_revision(&self, goal_id: &str) -> Result<(Goal, u64)> {
        let row = sqlx::query_as::<_, GoalRow>("SELECT * FROM goals WHERE id = ?")
            .bind(goal_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PlannerError::GoalNotFound(goal_id.to_string()))?;
        row.into_goal()
    }

    /// All goals, newest first.
    pub async fn list_goals(&self) -> Result<Vec<Goal>> {
        let rows = sqlx::query_as::<_, GoalRow>("SELECT * FROM goals ORDER BY created_at DESC, id")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| row.into_goal().map(|(goal, _)| goal))
            .collect()
    }

    /// Resolve a full goal id from an unambiguous prefix.
    pub async fn resolve_goal_id(&self, prefix: &str) -> Result<String> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT id FROM goals WHERE ?1 <> '' AND substr(id, 1, length(?1)) = ?1 ORDER BY id LIMIT 3",
        )
        .bind(prefix.trim())
        .fetch_all(&self.pool)
        .await?;
        pick_unique(prefix, ids, || PlannerError::GoalNotFound(prefix.to_string()))
    }

    /// Resolve a full task id within a goal from an unambiguous prefix.
    pub async fn resolve_task_id(&self, goal_id: &str, prefix: &str) -> Result<String> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT id FROM tasks WHERE goal_id = ?1 AND ?2 <> '' AND substr(id, 1, length(?2)) = ?2 ORDER BY id LIMIT 3",
        )
        .bind(goal_id)
        .bind(prefix.trim())
        .fetch_all(&self.pool)
        .await?;
        pick_unique(prefix, ids, || PlannerError::TaskNotFound(prefix.to_string()))
    }

    /// Edit goal metadata. The duration cannot shrink below a week that
    /// still holds tasks.
    pub async fn update_goal(&self, goal_id: &str, changes: &GoalChanges) -> Result<Snapshot> {
        let lock = self.goal_lock(goal_id);
        let _guard = lock.lock().await;

        let (mut goal, _) = self.goal_with_revision(goal_id).await?;
        if let Some(title) = &changes.title {
            goal.title = validate_title(title)?;
        }
        if let Some(weeks) = changes.duration_weeks {
            validate_duration(weeks)?;
            let max_week: Option<i64> =
                sqlx::query_scalar("SELECT MAX(week_number) FROM tasks WHERE goal_id = ?")
                    .bind(goal_id)
                    .fetch_one(&self.pool)
                    .await?;
            if let Some(max_week) = max_week {
                if max_week > i64::from(weeks) {
                    return Err(PlannerError::validation(
                        "duration_weeks",
                        format!("tasks are still scheduled in week {}", max_week),
                    ));
                }
            }
            goal.duration_weeks = weeks;
            goal.end_date = Goal::end_date_for(goal.start_date, weeks);
        }
        if let Some(priority) = changes.priority {
            goal.priority = priority;
        }
        if let Some(intensity) = changes.intensity {
            goal.intensity = intensity;
        }

        sqlx::query(
            r#"
            UPDATE goals
            SET title = ?, duration_weeks = ?, priority = ?, intensity = ?, end_date = ?,
                revision = revision + 1
            WHERE id = ?
            "#,
        )
        .bind(&goal.title)
        .bind(i64::from(goal.duration_weeks))
        .bind(goal.priority.as_str())
        .bind(goal.intensity.as_str())
        .bind(goal.end_date)
        .bind(goal_id)
        .execute(&self.pool)
        .await?;

        log_goal_operation!("update", goal_id);
        self.snapshot(goal_id).await
    }

    /// Delete a goal together with its tasks and daily log.
    pub async fn delete_goal(&self, goal_id: &str) -> Result<()> {
        let lock = self.goal_lock(goal_id);
        let _guard = lock.lock().await;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM tasks WHERE goal_id = ?")
            .bind(goal_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM daily_logs WHERE goal_id = ?")
            .bind(goal_id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM goals WHERE id = ?")
            .bind(goal_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(PlannerError::GoalNotFound(goal_id.to_string()));
        }
        tx.commit().await?;
        drop(_guard);
        self.forget_goal_lock(goal_id);

        log_goal_operation!("delete", goal_id);
        Ok(())
    }

    // ── Daily log ───────────────────────────────────────────────────

    /// Record one day of activity; recording the same date again replaces it.
    pub async fn record_daily_log(&self, goal_id: &str, entry: &DailyLogEntry) -> Result<Snapshot> {
        validate_log_values(i64::from(entry.tasks_completed), entry.hours_focused)?;

        let lock = self.goal_lock(goal_id);
        let _guard = lock.lock().await;

        let mut tx = self.pool.begin().await?;
        ensure_goal(&mut tx, goal_id).await?;
        sqlx::query(
            r#"
            INSERT INTO daily_logs (goal_id, log_date, tasks_completed, hours_focused,
                                    energy_level, time_of_day)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (goal_id, log_date) DO UPDATE SET
                tasks_completed = excluded.tasks_completed,
                hours_focused = excluded.hours_focused,
                energy_level = excluded.energy_level,
                time_of_day = excluded.time_of_day
            "#,
        )
        .bind(goal_id)
        .bind(entry.date)
        .bind(i64::from(entry.tasks_completed))
        .bind(entry.hours_focused)
        .bind(entry.energy_level.as_str())
        .bind(entry.time_of_day.as_str())
        .execute(&mut *tx)
        .await?;
        bump_revision(&mut tx, goal_id).await?;
        tx.commit().await?;

        log_goal_operation!("log_day", goal_id, entry.date.to_string().as_str());
        self.snapshot(goal_id).await
    }

    /// Daily log of a goal in chronological order.
    pub async fn list_daily_logs(&self, goal_id: &str) -> Result<Vec<DailyLogEntry>> {
        let rows = sqlx::query_as::<_, DailyLogRow>(
            r#"
            SELECT log_date, tasks_completed, hours_focused, energy_level, time_of_day
            FROM daily_logs
            WHERE goal_id = ?
            ORDER BY log_date ASC
            "#,
        )
        .bind(goal_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(DailyLogEntry::try_from).collect()
    }

    // ── Snapshots and intents ───────────────────────────────────────

    pub async fn snapshot(&self, goal_id: &str) -> Result<Snapshot> {
        let (goal, revision) = self.goal_with_revision(goal_id).await?;

        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {} FROM tasks WHERE goal_id = ? ORDER BY week_number, sort_order, created_at, id",
            TASK_COLUMNS
        ))
        .bind(goal_id)
        .fetch_all(&self.pool)
        .await?;
        let tasks = rows
            .into_iter()
            .map(Task::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Snapshot {
            revision,
            goal,
            tasks: TaskStore::new(tasks),
            daily_logs: self.list_daily_logs(goal_id).await?,
        })
    }

    /// Apply one intent atomically and return the new confirmed snapshot.
    pub async fn apply_intent(&self, goal_id: &str, intent: &MutationIntent) -> Result<Snapshot> {
        let lock = self.goal_lock(goal_id);
        let _guard = lock.lock().await;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let duration_weeks = ensure_goal(&mut tx, goal_id).await?;

        match intent {
            MutationIntent::CreateTasks { tasks } => {
                for task in tasks {
                    if task.goal_id != goal_id {
                        return Err(PlannerError::AdapterError(format!(
                            "task {} belongs to goal {}, not {}",
                            task.id, task.goal_id, goal_id
                        )));
                    }
                    check_week(task.week_number, duration_weeks)?;
                    insert_task(&mut tx, task).await?;
                }
            },
            MutationIntent::UpdateTask { id, changes } => {
                let row = sqlx::query_as::<_, TaskRow>(&format!(
                    "SELECT {} FROM tasks WHERE id = ? AND goal_id = ?",
                    TASK_COLUMNS
                ))
                .bind(id)
                .bind(goal_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| PlannerError::TaskNotFound(id.clone()))?;

                let mut task = Task::try_from(row)?;
                changes.apply_to(&mut task);
                check_week(task.week_number, duration_weeks)?;
                task.updated_at = now;
                write_task(&mut tx, &task).await?;
            },
            MutationIntent::DeleteTask { id } => {
                let deleted = sqlx::query("DELETE FROM tasks WHERE id = ? AND goal_id = ?")
                    .bind(id)
                    .bind(goal_id)
                    .execute(&mut *tx)
                    .await?;
                if deleted.rows_affected() == 0 {
                    return Err(PlannerError::TaskNotFound(id.clone()));
                }
            },
            MutationIntent::Reorder(reorder) => {
                if reorder.goal_id != goal_id {
                    return Err(PlannerError::AdapterError(format!(
                        "reorder targets goal {}, not {}",
                        reorder.goal_id, goal_id
                    )));
                }
                for entry in &reorder.entries {
                    check_week(entry.new_week_number, duration_weeks)?;
                    let updated = sqlx::query(
                        r#"
                        UPDATE tasks
                        SET sort_order = ?, week_number = ?, updated_at = ?
                        WHERE id = ? AND goal_id = ?
                        "#,
                    )
                    .bind(entry.new_order)
                    .bind(i64::from(entry.new_week_number))
                    .bind(now)
                    .bind(&entry.task_id)
                    .bind(goal_id)
                    .execute(&mut *tx)
                    .await?;
                    if updated.rows_affected() == 0 {
                        return Err(PlannerError::TaskNotFound(entry.task_id.clone()));
                    }
                }
            },
        }

        let revision = bump_revision(&mut tx, goal_id).await?;
        tx.commit().await?;
        tracing::debug!(goal_id, kind = intent.kind(), revision, "Applied intent");

        self.snapshot(goal_id).await
    }
}

impl std::fmt::Debug for SqliteAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteAdapter").finish_non_exhaustive()
    }
}

impl SyncAdapter for SqliteAdapter {
    fn load_snapshot(&self, goal_id: &str) -> impl std::future::Future<Output = Result<Snapshot>> + Send {
        self.snapshot(goal_id)
    }

    fn commit(
        &self,
        goal_id: &str,
        intent: &MutationIntent,
    ) -> impl std::future::Future<Output = Result<Snapshot>> + Send {
        self.apply_intent(goal_id, intent)
    }
}

fn pick_unique(prefix: &str, ids: Vec<String>, missing: impl FnOnce() -> PlannerError) -> Result<String> {
    if let Some(exact) = ids.iter().find(|id| id.as_str() == prefix.trim()) {
        return Ok(exact.clone());
    }
    match ids.len() {
        0 => Err(missing()),
        1 => Ok(ids.into_iter().next().unwrap_or_default()),
        _ => Err(PlannerError::InvalidInput(format!(
            "id prefix '{}' is ambiguous",
            prefix
        ))),
    }
}

fn check_week(week: u32, duration_weeks: u32) -> Result<()> {
    if week == 0 || week > duration_weeks {
        return Err(PlannerError::validation(
            "week_number",
            format!("must be between 1 and {} (got {})", duration_weeks, week),
        ));
    }
    Ok(())
}

/// Fail with `GoalNotFound` unless the goal exists; returns its duration.
async fn ensure_goal(tx: &mut Transaction<'_, Sqlite>, goal_id: &str) -> Result<u32> {
    let weeks: Option<i64> = sqlx::query_scalar("SELECT duration_weeks FROM goals WHERE id = ?")
        .bind(goal_id)
        .fetch_optional(&mut **tx)
        .await?;
    let weeks = weeks.ok_or_else(|| PlannerError::GoalNotFound(goal_id.to_string()))?;
    u32::try_from(weeks).map_err(|_| PlannerError::AdapterError(format!("bad duration {}", weeks)))
}

async fn bump_revision(tx: &mut Transaction<'_, Sqlite>, goal_id: &str) -> Result<u64> {
    let revision: i64 =
        sqlx::query_scalar("UPDATE goals SET revision = revision + 1 WHERE id = ? RETURNING revision")
            .bind(goal_id)
            .fetch_one(&mut **tx)
            .await?;
    Ok(revision.max(0) as u64)
}

async fn insert_task(tx: &mut Transaction<'_, Sqlite>, task: &Task) -> Result<()> {
    sqlx::query(&format!(
        "INSERT INTO tasks ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        TASK_COLUMNS
    ))
    .bind(&task.id)
    .bind(&task.goal_id)
    .bind(i64::from(task.week_number))
    .bind(task.day_number.map(i64::from))
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status.as_db_str())
    .bind(serde_json::to_string(&task.dependencies)?)
    .bind(task.order)
    .bind(task.created_at)
    .bind(task.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn write_task(tx: &mut Transaction<'_, Sqlite>, task: &Task) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE tasks
        SET week_number = ?, day_number = ?, title = ?, description = ?, status = ?,
            dependencies = ?, sort_order = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(i64::from(task.week_number))
    .bind(task.day_number.map(i64::from))
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status.as_db_str())
    .bind(serde_json::to_string(&task.dependencies)?)
    .bind(task.order)
    .bind(task.updated_at)
    .bind(&task.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations};
    use tempfile::TempDir;

    async fn adapter() -> (TempDir, SqliteAdapter) {
        let dir = TempDir::new().unwrap();
        let pool = create_pool(&dir.path().join("planner.db")).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (dir, SqliteAdapter::new(pool))
    }

    fn lock_count(adapter: &SqliteAdapter) -> usize {
        adapter.goal_locks.lock().unwrap().len()
    }

    #[tokio::test]
    async fn test_delete_goal_releases_its_lock() {
        let (_dir, adapter) = adapter().await;
        let goal = Goal::new("Learn Go", 2, Priority::Low, Intensity::Normal, chrono::Utc::now());
        adapter.create_goal(&goal).await.unwrap();
        adapter
            .update_goal(
                &goal.id,
                &GoalChanges {
                    title: Some("Learn Go properly".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(lock_count(&adapter), 1);

        adapter.delete_goal(&goal.id).await.unwrap();
        assert_eq!(lock_count(&adapter), 0);
    }

    #[test]
    fn test_pick_unique() {
        let ids = vec!["abc1".to_string()];
        assert_eq!(pick_unique("ab", ids, || PlannerError::InvalidInput("x".into())).unwrap(), "abc1");

        let ids = vec!["abc1".to_string(), "abc2".to_string()];
        assert!(pick_unique("abc", ids, || PlannerError::InvalidInput("x".into())).is_err());

        let ids = vec!["abc".to_string(), "abcd".to_string()];
        assert_eq!(pick_unique("abc", ids, || PlannerError::InvalidInput("x".into())).unwrap(), "abc");
    }
}
