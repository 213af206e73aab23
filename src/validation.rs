//! Input validation run before any mutation intent is issued.
//!
//! All functions are stateless and return `PlannerError::Validation` naming
//! the offending field.

use std::collections::HashSet;

use crate::dependencies::would_create_cycle;
use crate::error::{PlannerError, Result};
use crate::models::{Goal, Task, TaskId};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DURATION_WEEKS: u32 = 52;

/// Trim a title and check that it is non-empty and at most 200 characters.
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(PlannerError::validation("title", "must not be empty"));
    }
    let len = trimmed.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(PlannerError::validation(
            "title",
            format!("must be at most {} characters (got {})", MAX_TITLE_LEN, len),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_duration(duration_weeks: u32) -> Result<()> {
    if !(1..=MAX_DURATION_WEEKS).contains(&duration_weeks) {
        return Err(PlannerError::validation(
            "duration_weeks",
            format!(
                "must be between 1 and {} (got {})",
                MAX_DURATION_WEEKS, duration_weeks
            ),
        ));
    }
    Ok(())
}

pub fn validate_week(goal: &Goal, week_number: u32) -> Result<()> {
    if !goal.contains_week(week_number) {
        return Err(PlannerError::validation(
            "week_number",
            format!(
                "must be between 1 and {} (got {})",
                goal.duration_weeks, week_number
            ),
        ));
    }
    Ok(())
}

pub fn validate_day(day_number: u32) -> Result<()> {
    if !(1..=7).contains(&day_number) {
        return Err(PlannerError::validation(
            "day_number",
            format!("must be between 1 and 7 (got {})", day_number),
        ));
    }
    Ok(())
}

/// Validate a proposed dependency list for `task_id` against the collection.
///
/// Rejects self references, unknown ids and lists that would close a cycle.
/// Duplicates are removed, first occurrence wins.
pub fn validate_dependencies(tasks: &[Task], task_id: &str, proposed: &[TaskId]) -> Result<Vec<TaskId>> {
    let known: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut deduped = Vec::with_capacity(proposed.len());

    for dep in proposed {
        if dep == task_id {
            return Err(PlannerError::validation(
                "dependencies",
                format!("task {} cannot depend on itself", task_id),
            ));
        }
        if !known.contains(dep.as_str()) {
            return Err(PlannerError::validation(
                "dependencies",
                format!("unknown task id {}", dep),
            ));
        }
        if seen.insert(dep.as_str()) {
            deduped.push(dep.clone());
        }
    }

    if would_create_cycle(tasks, task_id, &deduped) {
        return Err(PlannerError::validation(
            "dependencies",
            format!("would create a dependency cycle through task {}", task_id),
        ));
    }

    Ok(deduped)
}

/// Upper bound for one day's focus hours.
pub const MAX_HOURS_PER_DAY: f64 = 24.0;

pub fn validate_log_values(tasks_completed: i64, hours_focused: f64) -> Result<()> {
    if tasks_completed < 0 {
        return Err(PlannerError::validation(
            "tasks_completed",
            format!("must not be negative (got {})", tasks_completed),
        ));
    }
    if !hours_focused.is_finite() || hours_focused < 0.0 {
        return Err(PlannerError::validation(
            "hours_focused",
            format!("must be a non-negative number (got {})", hours_focused),
        ));
    }
    if hours_focused > MAX_HOURS_PER_DAY {
        return Err(PlannerError::validation(
            "hours_focused",
            format!(
                "cannot exceed {} hours in one day (got {})",
                MAX_HOURS_PER_DAY, hours_focused
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Intensity, Priority};
    use chrono::Utc;

    fn task(id: &str, deps: &[&str]) -> Task {
        let mut t = Task::new("g", 1, id, Utc::now());
        t.id = id.to_string();
        t.dependencies = deps.iter().map(|d| d.to_string()).collect();
        t
    }

    fn ids(v: &[&str]) -> Vec<TaskId> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_title_trimmed_and_bounded() {
        assert_eq!(validate_title("  Read docs ").unwrap(), "Read docs");
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(200)).is_ok());
        let err = validate_title(&"x".repeat(201)).unwrap_err();
        assert_eq!(err.to_error_response().field.as_deref(), Some("title"));
    }

    #[test]
    fn test_duration_range() {
        assert!(validate_duration(0).is_err());
        assert!(validate_duration(1).is_ok());
        assert!(validate_duration(52).is_ok());
        assert!(validate_duration(53).is_err());
    }

    #[test]
    fn test_week_and_day_range() {
        let goal = Goal::new("G", 4, Priority::Medium, Intensity::Normal, Utc::now());
        assert!(validate_week(&goal, 0).is_err());
        assert!(validate_week(&goal, 4).is_ok());
        assert!(validate_week(&goal, 5).is_err());
        assert!(validate_day(0).is_err());
        assert!(validate_day(7).is_ok());
        assert!(validate_day(8).is_err());
    }

    #[test]
    fn test_self_dependency_rejected() {
        let tasks = vec![task("a", &[])];
        let err = validate_dependencies(&tasks, "a", &ids(&["a"])).unwrap_err();
        assert!(err.to_string().contains("cannot depend on itself"));
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let tasks = vec![task("a", &[])];
        assert!(validate_dependencies(&tasks, "a", &ids(&["nope"])).is_err());
    }

    #[test]
    fn test_cycle_rejected() {
        let tasks = vec![task("a", &[]), task("b", &["a"])];
        assert!(validate_dependencies(&tasks, "a", &ids(&["b"])).is_err());
    }

    #[test]
    fn test_duplicates_removed() {
        let tasks = vec![task("a", &[]), task("b", &[]), task("c", &[])];
        let deps = validate_dependencies(&tasks, "c", &ids(&["a", "b", "a"])).unwrap();
        assert_eq!(deps, ids(&["a", "b"]));
    }

    #[test]
    fn test_log_values() {
        assert!(validate_log_values(0, 0.0).is_ok());
        assert!(validate_log_values(-1, 1.0).is_err());
        assert!(validate_log_values(1, -0.5).is_err());
        assert!(validate_log_values(1, f64::NAN).is_err());
        assert!(validate_log_values(1, 24.0).is_ok());
        assert!(validate_log_values(1, 24.5).is_err());
        assert!(validate_log_values(1, 1e20).is_err());
    }
}
