//! Ordering engine: adjacent moves, week relocation and bucket numbering.
//!
//! Every operation reads a [`TaskStore`] and produces a [`ReorderIntent`]
//! for the sync adapter to apply atomically. Nothing here mutates the store.

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::models::{Goal, GoalId, TaskId};
use crate::store::TaskStore;
use crate::validation::validate_week;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(PlannerError::validation(
                "direction",
                format!("'{}' is not one of: up, down", s),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// Which tasks count as neighbours for an adjacent move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveScope {
    /// Rank within the task's own week bucket only.
    #[default]
    Week,
    /// Rank across the whole goal; a move can cross a week boundary.
    Goal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderEntry {
    pub task_id: TaskId,
    pub new_order: i64,
    pub new_week_number: u32,
}

/// A set of position changes applied as one atomic unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderIntent {
    pub goal_id: GoalId,
    pub entries: Vec<ReorderEntry>,
}

impl ReorderIntent {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved(ReorderIntent),
    /// No neighbour in that direction; nothing to do.
    Boundary { task_id: TaskId, direction: Direction },
    /// The request already matches the current state.
    Unchanged { task_id: TaskId },
}

/// Swap a task with its neighbour in display order.
///
/// The two tasks exchange their `(order, week_number)` pairs, so moving a
/// task up and then down again restores the original state.
pub fn move_adjacent(
    store: &TaskStore,
    task_id: &str,
    direction: Direction,
    scope: MoveScope,
) -> Result<MoveOutcome> {
    let task = store
        .get(task_id)
        .ok_or_else(|| PlannerError::TaskNotFound(task_id.to_string()))?;

    let ranked = match scope {
        MoveScope::Goal => store.display_order(),
        MoveScope::Week => store.bucket(task.week_number),
    };
    let pos = ranked
        .iter()
        .position(|t| t.id == task_id)
        .ok_or_else(|| PlannerError::TaskNotFound(task_id.to_string()))?;

    let neighbour = match direction {
        Direction::Up => pos.checked_sub(1).and_then(|i| ranked.get(i)),
        Direction::Down => ranked.get(pos + 1),
    };
    let Some(neighbour) = neighbour else {
        tracing::debug!(task_id, ?direction, "Move hit boundary");
        return Ok(MoveOutcome::Boundary {
            task_id: task_id.to_string(),
            direction,
        });
    };

    let mut entries = vec![
        ReorderEntry {
            task_id: task.id.clone(),
            new_order: neighbour.order,
            new_week_number: neighbour.week_number,
        },
        ReorderEntry {
            task_id: neighbour.id.clone(),
            new_order: task.order,
            new_week_number: task.week_number,
        },
    ];

    // Equal (order, week) pairs would swap to an identical state; bump the
    // moving task past its neighbour instead.
    if task.order == neighbour.order && task.week_number == neighbour.week_number {
        let delta = match direction {
            Direction::Up => -1,
            Direction::Down => 1,
        };
        entries = vec![ReorderEntry {
            task_id: task.id.clone(),
            new_order: neighbour.order + delta,
            new_week_number: neighbour.week_number,
        }];
    }

    Ok(MoveOutcome::Moved(ReorderIntent {
        goal_id: task.goal_id.clone(),
        entries,
    }))
}

/// Move a task to another week, keeping its `order`.
///
/// Collisions in the destination bucket are broken by the stable secondary
/// sort; [`normalize_bucket`] can renumber the bucket afterwards.
pub fn relocate_to_week(
    store: &TaskStore,
    goal: &Goal,
    task_id: &str,
    new_week: u32,
) -> Result<MoveOutcome> {
    let task = store
        .get(task_id)
        .ok_or_else(|| PlannerError::TaskNotFound(task_id.to_string()))?;
    validate_week(goal, new_week)?;

    if task.week_number == new_week {
        return Ok(MoveOutcome::Unchanged {
            task_id: task_id.to_string(),
        });
    }

    Ok(MoveOutcome::Moved(ReorderIntent {
        goal_id: goal.id.clone(),
        entries: vec![ReorderEntry {
            task_id: task.id.clone(),
            new_order: task.order,
            new_week_number: new_week,
        }],
    }))
}

/// Order value for a task appended to `week_number`.
pub fn insert_order(store: &TaskStore, week_number: u32) -> i64 {
    store.max_order(week_number).map_or(0, |max| max + 1)
}

/// Renumber a bucket to `0..n` in display order.
///
/// Only tasks whose order actually changes get an entry; an already dense
/// bucket yields an empty intent.
pub fn normalize_bucket(store: &TaskStore, goal_id: &str, week_number: u32) -> ReorderIntent {
    let entries = store
        .bucket(week_number)
        .into_iter()
        .zip(0i64..)
        .filter(|(task, idx)| task.order != *idx)
        .map(|(task, idx)| ReorderEntry {
            task_id: task.id.clone(),
            new_order: idx,
            new_week_number: week_number,
        })
        .collect();

    ReorderIntent {
        goal_id: goal_id.to_string(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Intensity, Priority, Task};
    use chrono::{Duration, TimeZone, Utc};

    fn task(id: &str, week: u32, order: i64) -> Task {
        let base = Utc.with_ymd_and_hms(2025, 12, 1, 9, 0, 0).unwrap();
        let mut t = Task::new("g1", week, id, base + Duration::seconds(order));
        t.id = id.to_string();
        t.order = order;
        t
    }

    fn goal(weeks: u32) -> Goal {
        let mut g = Goal::new("G", weeks, Priority::Medium, Intensity::Normal, Utc::now());
        g.id = "g1".to_string();
        g
    }

    fn ids(store: &TaskStore) -> Vec<String> {
        store.display_order().iter().map(|t| t.id.clone()).collect()
    }

    fn moved(outcome: MoveOutcome) -> ReorderIntent {
        match outcome {
            MoveOutcome::Moved(intent) => intent,
            other => panic!("expected a move, got {:?}", other),
        }
    }

    #[test]
    fn test_move_middle_up() {
        let store = TaskStore::new(vec![task("a", 1, 0), task("b", 1, 1), task("c", 1, 2)]);
        let intent = moved(move_adjacent(&store, "b", Direction::Up, MoveScope::Goal).unwrap());
        let next = store.apply(&crate::sync::MutationIntent::Reorder(intent), Utc::now());
        assert_eq!(ids(&next), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_boundary_is_not_an_error() {
        let store = TaskStore::new(vec![task("a", 1, 0), task("b", 1, 1)]);
        assert_eq!(
            move_adjacent(&store, "a", Direction::Up, MoveScope::Goal).unwrap(),
            MoveOutcome::Boundary {
                task_id: "a".to_string(),
                direction: Direction::Up
            }
        );
        assert!(matches!(
            move_adjacent(&store, "b", Direction::Down, MoveScope::Week).unwrap(),
            MoveOutcome::Boundary { .. }
        ));
    }

    #[test]
    fn test_goal_scope_crosses_weeks() {
        let store = TaskStore::new(vec![task("a", 1, 0), task("b", 2, 0)]);
        let intent = moved(move_adjacent(&store, "b", Direction::Up, MoveScope::Goal).unwrap());
        let next = store.apply(&crate::sync::MutationIntent::Reorder(intent), Utc::now());
        assert_eq!(next.get("b").unwrap().week_number, 1);
        assert_eq!(next.get("a").unwrap().week_number, 2);

        assert!(matches!(
            move_adjacent(&store, "b", Direction::Up, MoveScope::Week).unwrap(),
            MoveOutcome::Boundary { .. }
        ));
    }

    #[test]
    fn test_swap_is_invertible() {
        let store = TaskStore::new(vec![task("a", 1, 0), task("b", 1, 5), task("c", 2, 1)]);
        let up = moved(move_adjacent(&store, "c", Direction::Up, MoveScope::Goal).unwrap());
        let after_up = store.apply(&crate::sync::MutationIntent::Reorder(up), Utc::now());
        let down = moved(move_adjacent(&after_up, "c", Direction::Down, MoveScope::Goal).unwrap());
        let restored = after_up.apply(&crate::sync::MutationIntent::Reorder(down), Utc::now());
        for id in ["a", "b", "c"] {
            let (before, after) = (store.get(id).unwrap(), restored.get(id).unwrap());
            assert_eq!((before.order, before.week_number), (after.order, after.week_number));
        }
    }

    #[test]
    fn test_move_with_colliding_orders_still_moves() {
        let store = TaskStore::new(vec![task("a", 1, 0), task("b", 1, 0)]);
        let before = ids(&store);
        let last = before[1].clone();
        let intent = moved(move_adjacent(&store, &last, Direction::Up, MoveScope::Week).unwrap());
        let next = store.apply(&crate::sync::MutationIntent::Reorder(intent), Utc::now());
        assert_eq!(ids(&next)[0], last);
    }

    #[test]
    fn test_move_missing_task_errors() {
        let store = TaskStore::default();
        assert!(matches!(
            move_adjacent(&store, "x", Direction::Up, MoveScope::Goal),
            Err(PlannerError::TaskNotFound(_))
        ));
    }

    #[test]
    fn test_relocate_keeps_order() {
        let store = TaskStore::new(vec![task("a", 1, 3)]);
        let intent = moved(relocate_to_week(&store, &goal(4), "a", 3).unwrap());
        assert_eq!(
            intent.entries,
            vec![ReorderEntry {
                task_id: "a".to_string(),
                new_order: 3,
                new_week_number: 3
            }]
        );
    }

    #[test]
    fn test_relocate_validates_week() {
        let store = TaskStore::new(vec![task("a", 1, 0)]);
        assert!(relocate_to_week(&store, &goal(4), "a", 5).is_err());
        assert!(relocate_to_week(&store, &goal(4), "a", 0).is_err());
        assert!(matches!(
            relocate_to_week(&store, &goal(4), "a", 1).unwrap(),
            MoveOutcome::Unchanged { .. }
        ));
    }

    #[test]
    fn test_insert_order() {
        let store = TaskStore::new(vec![task("a", 1, 0), task("b", 1, 4)]);
        assert_eq!(insert_order(&store, 1), 5);
        assert_eq!(insert_order(&store, 2), 0);
    }

    #[test]
    fn test_normalize_bucket_emits_only_changes() {
        let store = TaskStore::new(vec![task("a", 1, 0), task("b", 1, 4), task("c", 1, 9)]);
        let intent = normalize_bucket(&store, "g1", 1);
        let changed: Vec<(&str, i64)> = intent
            .entries
            .iter()
            .map(|e| (e.task_id.as_str(), e.new_order))
            .collect();
        assert_eq!(changed, vec![("b", 1), ("c", 2)]);

        let dense = TaskStore::new(vec![task("a", 1, 0), task("b", 1, 1)]);
        assert!(normalize_bucket(&dense, "g1", 1).is_empty());
    }
}
