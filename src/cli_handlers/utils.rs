//! Helpers shared by the CLI handlers: id resolution and text rendering.

use crate::db::SqliteAdapter;
use crate::error::{PlannerError, Result};
use crate::models::{Goal, TaskStatus, TaskWithLock};
use crate::planner::{MutationOutcome, WeekView};

/// Resolve `--goal`; when omitted, the only existing goal is used.
pub async fn resolve_goal(adapter: &SqliteAdapter, goal: Option<&str>) -> Result<String> {
    if let Some(prefix) = goal {
        return adapter.resolve_goal_id(prefix).await;
    }
    let goals = adapter.list_goals().await?;
    match goals.as_slice() {
        [only] => Ok(only.id.clone()),
        [] => Err(PlannerError::GoalNotFound(
            "no goals yet; create one with 'gp goal create'".to_string(),
        )),
        _ => Err(PlannerError::InvalidInput(format!(
            "{} goals exist; pass --goal <ID>",
            goals.len()
        ))),
    }
}

/// Resolve each task id prefix within a goal.
pub async fn resolve_tasks(adapter: &SqliteAdapter, goal_id: &str, prefixes: &[String]) -> Result<Vec<String>> {
    let mut ids = Vec::with_capacity(prefixes.len());
    for prefix in prefixes {
        ids.push(adapter.resolve_task_id(goal_id, prefix).await?);
    }
    Ok(ids)
}

/// Get a status badge icon for a task
pub fn get_status_badge(status: TaskStatus, is_locked: bool) -> &'static str {
    if is_locked && !status.is_completed() {
        return "🔒";
    }
    match status {
        TaskStatus::Completed => "✓",
        TaskStatus::InProgress => "→",
        TaskStatus::NotStarted => "○",
    }
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn print_goal(goal: &Goal) {
    println!("Goal {}: {}", short_id(&goal.id), goal.title);
    println!(
        "  {} week(s), {} → {}",
        goal.duration_weeks,
        goal.start_date.date_naive(),
        goal.end_date.date_naive()
    );
    println!("  Priority: {}  Intensity: {}", goal.priority.as_str(), goal.intensity.as_str());
}

pub fn print_task_line(entry: &TaskWithLock) {
    let task = &entry.task;
    let badge = get_status_badge(task.status, entry.is_locked);
    let day = task.day_number.map(|d| format!(" (day {})", d)).unwrap_or_default();
    println!("  {} {} {}{}", badge, short_id(&task.id), task.title, day);
    if !task.dependencies.is_empty() {
        let deps: Vec<&str> = task.dependencies.iter().map(|d| short_id(d)).collect();
        println!("      after: {}", deps.join(", "));
    }
}

pub fn print_weeks(weeks: &[WeekView]) {
    for week in weeks {
        println!("Week {}", week.week_number);
        if week.tasks.is_empty() {
            println!("  (no tasks)");
        }
        for entry in &week.tasks {
            print_task_line(entry);
        }
    }
}

/// Print a mutation outcome, as JSON or as a one-line summary.
pub fn print_outcome(action: &str, outcome: &MutationOutcome, format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }
    match outcome {
        MutationOutcome::Applied { revision } => {
            println!("{} (revision {})", action, revision);
        },
        MutationOutcome::Deleted { revision, orphaned } => {
            println!("{} (revision {})", action, revision);
            let ids: Vec<&str> = orphaned.iter().map(|id| short_id(id)).collect();
            eprintln!("Warning: these tasks now wait on a deleted task: {}", ids.join(", "));
        },
        MutationOutcome::Boundary { task_id, direction } => {
            println!("Task {} is already at the {} boundary", short_id(task_id), direction.as_str());
        },
        MutationOutcome::AlreadySatisfied { task_id } => {
            println!("Task {} was already removed", short_id(task_id));
        },
        MutationOutcome::Unchanged { target } => {
            println!("Nothing to change for {}", short_id(target));
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_badges() {
        assert_eq!(get_status_badge(TaskStatus::Completed, false), "✓");
        assert_eq!(get_status_badge(TaskStatus::InProgress, false), "→");
        assert_eq!(get_status_badge(TaskStatus::NotStarted, false), "○");
        assert_eq!(get_status_badge(TaskStatus::NotStarted, true), "🔒");
        // Completed tasks keep their badge even with dangling dependencies
        assert_eq!(get_status_badge(TaskStatus::Completed, true), "✓");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id("week 3"), "week 3");
    }
}
