//! Bulk task generation for a goal.
//!
//! The wording of generated tasks comes from a [`TitleSource`]; this module
//! only lays the titles out over weeks and wires up their dependencies.

use chrono::{DateTime, Utc};

use crate::dependencies::chain_sequential;
use crate::error::{PlannerError, Result};
use crate::models::{Goal, Task};
use crate::validation::validate_title;

/// Content collaborator that supplies task titles for a goal.
pub trait TitleSource {
    /// Up to `count` titles in the order they should be worked on.
    fn titles(&self, goal: &Goal, count: usize) -> Vec<String>;
}

impl<F> TitleSource for F
where
    F: Fn(&Goal, usize) -> Vec<String>,
{
    fn titles(&self, goal: &Goal, count: usize) -> Vec<String> {
        self(goal, count)
    }
}

/// Number of tasks generation produces for `goal`.
pub fn generated_count(goal: &Goal) -> usize {
    goal.duration_weeks as usize * goal.intensity.tasks_per_week()
}

/// Lay out generated tasks week by week.
///
/// Each week gets `tasks_per_week` consecutive titles with orders
/// `0..tasks_per_week`. Every task depends on the one before it in the
/// flattened sequence, so the first task of week N depends on the last task
/// of week N-1. Extra titles are dropped; a short list leaves the trailing
/// weeks empty.
pub fn plan_generated_tasks(
    goal: &Goal,
    source: &dyn TitleSource,
    now: DateTime<Utc>,
) -> Result<Vec<Task>> {
    let per_week = goal.intensity.tasks_per_week();
    let count = generated_count(goal);

    let titles = source.titles(goal, count);
    if titles.is_empty() {
        return Err(PlannerError::validation(
            "titles",
            "title source returned no titles",
        ));
    }

    let mut tasks = Vec::with_capacity(count.min(titles.len()));
    for (idx, raw) in titles.iter().take(count).enumerate() {
        let title = validate_title(raw)?;
        let week = (idx / per_week) as u32 + 1;
        let mut task = Task::new(&goal.id, week, &title, now);
        task.order = (idx % per_week) as i64;
        task.description = Some(format!("Complete {} for {}", title, goal.title));
        tasks.push(task);
    }

    chain_sequential(&mut tasks);

    tracing::debug!(
        goal_id = %goal.id,
        generated = tasks.len(),
        per_week,
        "Planned generated tasks"
    );
    Ok(tasks)
}
