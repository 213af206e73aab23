//! Core data model: goals, week-scoped tasks, and the daily activity log.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PlannerError, Result};

pub type TaskId = String;
pub type GoalId = String;

/// Normalise user-facing enum spellings ("Not Started", "in-progress") to snake_case.
fn normalize_key(s: &str) -> String {
    s.trim().to_lowercase().replace([' ', '-'], "_")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match normalize_key(s).as_str() {
            "not_started" | "todo" => Some(TaskStatus::NotStarted),
            "in_progress" | "doing" => Some(TaskStatus::InProgress),
            "completed" | "done" => Some(TaskStatus::Completed),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        Self::from_db_str(s).ok_or_else(|| {
            PlannerError::validation(
                "status",
                format!("'{}' is not one of: not_started, in_progress, completed", s),
            )
        })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskStatus::NotStarted => "Not Started",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match normalize_key(s).as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(PlannerError::validation(
                "priority",
                format!("'{}' is not one of: Low, Medium, High", s),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intensity {
    Light,
    Normal,
    Aggressive,
}

impl Intensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Light => "Light",
            Intensity::Normal => "Normal",
            Intensity::Aggressive => "Aggressive",
        }
    }

    /// Accepts the legacy spellings `Relaxed` and `Intense` as well.
    pub fn parse(s: &str) -> Result<Self> {
        match normalize_key(s).as_str() {
            "light" | "relaxed" => Ok(Intensity::Light),
            "normal" => Ok(Intensity::Normal),
            "aggressive" | "intense" => Ok(Intensity::Aggressive),
            _ => Err(PlannerError::validation(
                "intensity",
                format!("'{}' is not one of: Light, Normal, Aggressive", s),
            )),
        }
    }

    /// How many tasks generation places in each week.
    pub fn tasks_per_week(&self) -> usize {
        match self {
            Intensity::Light => 2,
            Intensity::Normal => 3,
            Intensity::Aggressive => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub title: String,
    pub duration_weeks: u32,
    pub priority: Priority,
    pub intensity: Intensity,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    /// Build a goal starting at `now`; the end date is derived from the duration.
    pub fn new(
        title: &str,
        duration_weeks: u32,
        priority: Priority,
        intensity: Intensity,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.trim().to_string(),
            duration_weeks,
            priority,
            intensity,
            start_date: now,
            end_date: Self::end_date_for(now, duration_weeks),
            created_at: now,
        }
    }

    pub fn end_date_for(start: DateTime<Utc>, duration_weeks: u32) -> DateTime<Utc> {
        start + Duration::weeks(i64::from(duration_weeks))
    }

    pub fn contains_week(&self, week_number: u32) -> bool {
        (1..=self.duration_weeks).contains(&week_number)
    }

    /// Calendar date on which a task scheduled at `(week, day)` falls due.
    ///
    /// Week-level tasks (no day) are due on the last day of their week.
    pub fn due_date(&self, week_number: u32, day_number: Option<u32>) -> NaiveDate {
        let week_start = self.start_date.date_naive()
            + Duration::days(i64::from(week_number.saturating_sub(1)) * 7);
        let offset = day_number.map_or(6, |d| i64::from(d.clamp(1, 7)) - 1);
        week_start + Duration::days(offset)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub goal_id: GoalId,
    pub week_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_number: Option<u32>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub dependencies: Vec<TaskId>,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// A fresh, not-started task with no dependencies.
    pub fn new(goal_id: &str, week_number: u32, title: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            goal_id: goal_id.to_string(),
            week_number,
            day_number: None,
            title: title.trim().to_string(),
            description: None,
            status: TaskStatus::NotStarted,
            dependencies: Vec::new(),
            order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn depends_on(&self, id: &str) -> bool {
        self.dependencies.iter().any(|d| d == id)
    }
}

/// A task paired with its resolved lock state, as handed to renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskWithLock {
    #[serde(flatten)]
    pub task: Task,
    pub is_locked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    /// Fixed enumeration order; analytics break ties by it.
    pub const ALL: [TimeOfDay; 3] = [TimeOfDay::Morning, TimeOfDay::Afternoon, TimeOfDay::Evening];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match normalize_key(s).as_str() {
            "morning" => Ok(TimeOfDay::Morning),
            "afternoon" => Ok(TimeOfDay::Afternoon),
            "evening" => Ok(TimeOfDay::Evening),
            _ => Err(PlannerError::validation(
                "time_of_day",
                format!("'{}' is not one of: Morning, Afternoon, Evening", s),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyLevel {
    High,
    Low,
}

impl EnergyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyLevel::High => "High",
            EnergyLevel::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match normalize_key(s).as_str() {
            "high" => Ok(EnergyLevel::High),
            "low" => Ok(EnergyLevel::Low),
            _ => Err(PlannerError::validation(
                "energy_level",
                format!("'{}' is not one of: High, Low", s),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLogEntry {
    pub date: NaiveDate,
    pub tasks_completed: u32,
    pub hours_focused: f64,
    pub energy_level: EnergyLevel,
    pub time_of_day: TimeOfDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusStatus {
    Complete,
    Incomplete,
}

/// A task as seen by the today's-focus list: a due date and a binary status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusTask {
    pub id: TaskId,
    pub title: String,
    pub due_date: NaiveDate,
    pub status: FocusStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<NaiveDate>,
}

impl FocusTask {
    pub fn from_task(goal: &Goal, task: &Task) -> Self {
        let completed = task.status.is_completed();
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            due_date: goal.due_date(task.week_number, task.day_number),
            status: if completed {
                FocusStatus::Complete
            } else {
                FocusStatus::Incomplete
            },
            completed_at: completed.then(|| task.updated_at.date_naive()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_status_parse_accepts_display_spellings() {
        assert_eq!(TaskStatus::parse("Not Started").unwrap(), TaskStatus::NotStarted);
        assert_eq!(TaskStatus::parse("in-progress").unwrap(), TaskStatus::InProgress);
        assert_eq!(TaskStatus::parse("COMPLETED").unwrap(), TaskStatus::Completed);
        assert_eq!(TaskStatus::parse("done").unwrap(), TaskStatus::Completed);
        assert!(TaskStatus::parse("blocked").is_err());
    }

    #[test]
    fn test_status_db_roundtrip() {
        for status in [TaskStatus::NotStarted, TaskStatus::InProgress, TaskStatus::Completed] {
            assert_eq!(TaskStatus::from_db_str(status.as_db_str()), Some(status));
        }
    }

    #[test]
    fn test_intensity_aliases_and_tasks_per_week() {
        assert_eq!(Intensity::parse("Relaxed").unwrap(), Intensity::Light);
        assert_eq!(Intensity::parse("intense").unwrap(), Intensity::Aggressive);
        assert_eq!(Intensity::Light.tasks_per_week(), 2);
        assert_eq!(Intensity::Normal.tasks_per_week(), 3);
        assert_eq!(Intensity::Aggressive.tasks_per_week(), 4);
        assert!(Intensity::parse("extreme").is_err());
    }

    #[test]
    fn test_goal_end_date_is_derived() {
        let goal = Goal::new("  Learn Rust ", 4, Priority::High, Intensity::Normal, start());
        assert_eq!(goal.title, "Learn Rust");
        assert_eq!(goal.end_date - goal.start_date, Duration::weeks(4));
        assert!(goal.contains_week(1));
        assert!(goal.contains_week(4));
        assert!(!goal.contains_week(0));
        assert!(!goal.contains_week(5));
    }

    #[test]
    fn test_due_date_for_week_and_day() {
        let goal = Goal::new("Goal", 2, Priority::Low, Intensity::Light, start());
        let first_day = start().date_naive();
        assert_eq!(goal.due_date(1, Some(1)), first_day);
        assert_eq!(goal.due_date(1, None), first_day + Duration::days(6));
        assert_eq!(goal.due_date(2, Some(3)), first_day + Duration::days(9));
    }

    #[test]
    fn test_focus_task_from_completed_task() {
        let goal = Goal::new("Goal", 1, Priority::Low, Intensity::Light, start());
        let mut task = Task::new(&goal.id, 1, "Read", start());
        task.status = TaskStatus::Completed;

        let focus = FocusTask::from_task(&goal, &task);
        assert_eq!(focus.status, FocusStatus::Complete);
        assert_eq!(focus.completed_at, Some(start().date_naive()));
    }

    #[test]
    fn test_task_with_lock_flattens() {
        let task = Task::new("g1", 1, "Read", start());
        let json = serde_json::to_value(TaskWithLock {
            task,
            is_locked: true,
        })
        .unwrap();
        assert_eq!(json["title"], "Read");
        assert_eq!(json["is_locked"], true);
        assert_eq!(json["status"], "not_started");
    }
}
