//! Row shapes as stored in SQLite and their conversion into core models.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::error::{PlannerError, Result};
use crate::models::{
    DailyLogEntry, EnergyLevel, Goal, Intensity, Priority, Task, TaskStatus, TimeOfDay,
};

#[derive(Debug, Clone, FromRow)]
pub struct GoalRow {
    pub id: String,
    pub title: String,
    pub duration_weeks: i64,
    pub priority: String,
    pub intensity: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub revision: i64,
}

impl GoalRow {
    pub fn into_goal(self) -> Result<(Goal, u64)> {
        let goal = Goal {
            id: self.id,
            title: self.title,
            duration_weeks: u32::try_from(self.duration_weeks)
                .map_err(|_| corrupt("duration_weeks", self.duration_weeks))?,
            priority: Priority::parse(&self.priority)?,
            intensity: Intensity::parse(&self.intensity)?,
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: self.created_at,
        };
        let revision = u64::try_from(self.revision).map_err(|_| corrupt("revision", self.revision))?;
        Ok((goal, revision))
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: String,
    pub goal_id: String,
    pub week_number: i64,
    pub day_number: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub dependencies: String,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = PlannerError;

    fn try_from(row: TaskRow) -> Result<Self> {
        let status = TaskStatus::from_db_str(&row.status).ok_or_else(|| {
            PlannerError::AdapterError(format!("unknown task status '{}' in row {}", row.status, row.id))
        })?;
        let day_number = match row.day_number {
            Some(day) => Some(u32::try_from(day).map_err(|_| corrupt("day_number", day))?),
            None => None,
        };
        Ok(Task {
            week_number: u32::try_from(row.week_number)
                .map_err(|_| corrupt("week_number", row.week_number))?,
            day_number,
            dependencies: serde_json::from_str(&row.dependencies)?,
            status,
            order: row.sort_order,
            id: row.id,
            goal_id: row.goal_id,
            title: row.title,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DailyLogRow {
    pub log_date: NaiveDate,
    pub tasks_completed: i64,
    pub hours_focused: f64,
    pub energy_level: String,
    pub time_of_day: String,
}

impl TryFrom<DailyLogRow> for DailyLogEntry {
    type Error = PlannerError;

    fn try_from(row: DailyLogRow) -> Result<Self> {
        Ok(DailyLogEntry {
            date: row.log_date,
            tasks_completed: u32::try_from(row.tasks_completed)
                .map_err(|_| corrupt("tasks_completed", row.tasks_completed))?,
            hours_focused: row.hours_focused,
            energy_level: EnergyLevel::parse(&row.energy_level)?,
            time_of_day: TimeOfDay::parse(&row.time_of_day)?,
        })
    }
}

fn corrupt(column: &str, value: i64) -> PlannerError {
    PlannerError::AdapterError(format!("stored {} out of range: {}", column, value))
}
