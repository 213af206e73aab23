//! Confirmed goal snapshots and revision-based reconciliation.

use serde::{Deserialize, Serialize};

use crate::models::{DailyLogEntry, Goal};
use crate::store::TaskStore;

/// Authoritative state of one goal as returned by the sync adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Bumped by every committed intent for this goal.
    pub revision: u64,
    pub goal: Goal,
    pub tasks: TaskStore,
    /// Chronological, one entry per date.
    pub daily_logs: Vec<DailyLogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    Applied { revision: u64 },
    /// A snapshot at or below the current revision arrived late.
    Stale { offered: u64, current: u64 },
}

/// Holds the freshest snapshot seen so far (last writer wins by revision).
#[derive(Debug, Clone)]
pub struct SnapshotTracker {
    current: Snapshot,
}

impl SnapshotTracker {
    pub fn new(initial: Snapshot) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    pub fn revision(&self) -> u64 {
        self.current.revision
    }

    /// Adopt `snapshot` if it is newer than the current one.
    pub fn offer(&mut self, snapshot: Snapshot) -> Reconciled {
        if snapshot.goal.id != self.current.goal.id || snapshot.revision <= self.current.revision {
            tracing::warn!(
                goal_id = %snapshot.goal.id,
                offered = snapshot.revision,
                current = self.current.revision,
                "Discarding stale snapshot"
            );
            return Reconciled::Stale {
                offered: snapshot.revision,
                current: self.current.revision,
            };
        }

        let revision = snapshot.revision;
        self.current = snapshot;
        tracing::debug!(goal_id = %self.current.goal.id, revision, "Adopted snapshot");
        Reconciled::Applied { revision }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Intensity, Priority, Task};
    use chrono::Utc;

    fn snapshot(revision: u64, goal: &Goal, titles: &[&str]) -> Snapshot {
        let tasks = titles
            .iter()
            .map(|t| Task::new(&goal.id, 1, t, Utc::now()))
            .collect();
        Snapshot {
            revision,
            goal: goal.clone(),
            tasks: TaskStore::new(tasks),
            daily_logs: Vec::new(),
        }
    }

    #[test]
    fn test_newer_snapshot_applied() {
        let goal = Goal::new("G", 2, Priority::Low, Intensity::Light, Utc::now());
        let mut tracker = SnapshotTracker::new(snapshot(1, &goal, &[]));
        assert_eq!(
            tracker.offer(snapshot(2, &goal, &["a"])),
            Reconciled::Applied { revision: 2 }
        );
        assert_eq!(tracker.current().tasks.len(), 1);
    }

    #[test]
    fn test_late_snapshot_discarded() {
        let goal = Goal::new("G", 2, Priority::Low, Intensity::Light, Utc::now());
        let mut tracker = SnapshotTracker::new(snapshot(3, &goal, &["a", "b"]));
        assert_eq!(
            tracker.offer(snapshot(2, &goal, &[])),
            Reconciled::Stale {
                offered: 2,
                current: 3
            }
        );
        assert_eq!(tracker.offer(snapshot(3, &goal, &[])), Reconciled::Stale { offered: 3, current: 3 });
        assert_eq!(tracker.current().tasks.len(), 2);
        assert_eq!(tracker.revision(), 3);
    }

    #[test]
    fn test_other_goal_snapshot_discarded() {
        let goal = Goal::new("G", 2, Priority::Low, Intensity::Light, Utc::now());
        let other = Goal::new("H", 2, Priority::Low, Intensity::Light, Utc::now());
        let mut tracker = SnapshotTracker::new(snapshot(1, &goal, &[]));
        assert!(matches!(tracker.offer(snapshot(9, &other, &[])), Reconciled::Stale { .. }));
        assert_eq!(tracker.current().goal.id, goal.id);
    }
}
