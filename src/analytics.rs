//! Progress analytics over a goal's daily log and task list.
//!
//! Every function here is a pure transform; the same inputs always produce the
//! same series. Nothing is stored, callers recompute on every snapshot.

use chrono::NaiveDate;
use serde::Serialize;

use crate::dependencies::resolve_locks;
use crate::models::{
    DailyLogEntry, EnergyLevel, FocusStatus, FocusTask, GoalId, Intensity, Priority, TaskStatus,
    TimeOfDay,
};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurndownPoint {
    pub date: NaiveDate,
    pub ideal_remaining: f64,
    /// Displayed value, floored at zero.
    pub actual_remaining: i64,
    pub is_ahead: bool,
}

/// Ideal-vs-actual burndown, one point per log entry.
///
/// The ideal line burns `tasks_total / days` per day. The actual line is a
/// running total seeded at `tasks_total` and decremented by each day's
/// completions; it is never clamped internally, only the displayed value is
/// floored at zero. `is_ahead` compares the unclamped running total with the
/// unclamped ideal for that day.
pub fn burndown(tasks_total: usize, logs: &[DailyLogEntry]) -> Vec<BurndownPoint> {
    if logs.is_empty() {
        return Vec::new();
    }

    let total = tasks_total as f64;
    let burn = total / logs.len() as f64;
    let mut running = tasks_total as i64;

    logs.iter()
        .enumerate()
        .map(|(i, entry)| {
            running -= i64::from(entry.tasks_completed);
            let raw_ideal = total - burn * (i + 1) as f64;
            BurndownPoint {
                date: entry.date,
                ideal_remaining: raw_ideal.max(0.0),
                actual_remaining: running.max(0),
                is_ahead: (running as f64) <= raw_ideal,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatPoint {
    pub date: NaiveDate,
    pub hours_focused: f64,
    pub tasks_completed: u32,
    pub energy_level: EnergyLevel,
}

/// Day-by-day projection of the log; no aggregation.
pub fn heat_series(logs: &[DailyLogEntry]) -> Vec<HeatPoint> {
    logs.iter()
        .map(|entry| HeatPoint {
            date: entry.date,
            hours_focused: entry.hours_focused,
            tasks_completed: entry.tasks_completed,
            energy_level: entry.energy_level,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeOfDayStats {
    pub time_of_day: TimeOfDay,
    pub total_tasks: u64,
    pub productive_days: u32,
    pub avg_productivity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductivityReport {
    /// Morning, Afternoon, Evening, in that order.
    pub buckets: Vec<TimeOfDayStats>,
    pub peak: TimeOfDay,
    pub peak_percentage: u32,
}

/// Rank the time-of-day windows by average completions on productive days.
///
/// Only days with at least one completed task count. Ties go to the earliest
/// window in Morning, Afternoon, Evening order. With no productive day every
/// average is zero, the peak is Morning and the percentage is 0.
pub fn productivity_by_time_of_day(logs: &[DailyLogEntry]) -> ProductivityReport {
    let buckets: Vec<TimeOfDayStats> = TimeOfDay::ALL
        .iter()
        .map(|&tod| {
            let (sum, count) = logs
                .iter()
                .filter(|e| e.tasks_completed > 0 && e.time_of_day == tod)
                .fold((0u64, 0u32), |(sum, count), e| {
                    (sum + u64::from(e.tasks_completed), count + 1)
                });
            TimeOfDayStats {
                time_of_day: tod,
                total_tasks: sum,
                productive_days: count,
                avg_productivity: if count == 0 {
                    0.0
                } else {
                    sum as f64 / f64::from(count)
                },
            }
        })
        .collect();

    let mut peak_idx = 0;
    for (i, stats) in buckets.iter().enumerate() {
        if stats.avg_productivity > buckets[peak_idx].avg_productivity {
            peak_idx = i;
        }
    }

    let avg_sum: f64 = buckets.iter().map(|b| b.avg_productivity).sum();
    let peak_percentage = if avg_sum > 0.0 {
        (buckets[peak_idx].avg_productivity / avg_sum * 100.0).round() as u32
    } else {
        0
    };

    ProductivityReport {
        peak: buckets[peak_idx].time_of_day,
        buckets,
        peak_percentage,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusItem {
    #[serde(flatten)]
    pub task: FocusTask,
    pub is_overdue: bool,
}

/// Flag overdue tasks relative to `today`. Status is never changed.
pub fn todays_focus(tasks: &[FocusTask], today: NaiveDate) -> Vec<FocusItem> {
    tasks
        .iter()
        .map(|task| FocusItem {
            is_overdue: task.due_date < today && task.status == FocusStatus::Incomplete,
            task: task.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub locked: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalSummary {
    pub id: GoalId,
    pub title: String,
    pub duration_weeks: u32,
    pub priority: Priority,
    pub intensity: Intensity,
    pub tasks_total: usize,
    pub completion_percentage: u32,
}

/// Everything the progress view renders for one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    pub as_of: NaiveDate,
    pub revision: u64,
    pub goal: GoalSummary,
    pub status: StatusBreakdown,
    pub burndown: Vec<BurndownPoint>,
    pub heat: Vec<HeatPoint>,
    pub productivity: ProductivityReport,
    pub focus: Vec<FocusItem>,
}

impl ProgressReport {
    pub fn build(snapshot: &Snapshot, today: NaiveDate) -> Self {
        let tasks = snapshot.tasks.tasks();
        let locks = resolve_locks(tasks);

        let mut status = StatusBreakdown::default();
        for task in tasks {
            match task.status {
                TaskStatus::NotStarted => status.not_started += 1,
                TaskStatus::InProgress => status.in_progress += 1,
                TaskStatus::Completed => status.completed += 1,
            }
            if locks.get(&task.id).copied().unwrap_or(false) {
                status.locked += 1;
            }
        }

        let tasks_total = tasks.len();
        let completion_percentage = if tasks_total == 0 {
            0
        } else {
            (status.completed as f64 / tasks_total as f64 * 100.0).round() as u32
        };

        let focus_tasks: Vec<FocusTask> = snapshot
            .tasks
            .display_order()
            .into_iter()
            .map(|t| FocusTask::from_task(&snapshot.goal, t))
            .collect();

        tracing::debug!(
            goal_id = %snapshot.goal.id,
            revision = snapshot.revision,
            tasks_total,
            "Built progress report"
        );

        Self {
            as_of: today,
            revision: snapshot.revision,
            goal: GoalSummary {
                id: snapshot.goal.id.clone(),
                title: snapshot.goal.title.clone(),
                duration_weeks: snapshot.goal.duration_weeks,
                priority: snapshot.goal.priority,
                intensity: snapshot.goal.intensity,
                tasks_total,
                completion_percentage,
            },
            status,
            burndown: burndown(tasks_total, &snapshot.daily_logs),
            heat: heat_series(&snapshot.daily_logs),
            productivity: productivity_by_time_of_day(&snapshot.daily_logs),
            focus: todays_focus(&focus_tasks, today),
        }
    }
}
