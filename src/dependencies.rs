//! Dependency resolution: lock state and cycle analysis.
//!
//! Everything here is a pure function of the task collection. Callers
//! recompute after every mutation; nothing is cached.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::models::{Task, TaskId, TaskStatus};

/// Why a single prerequisite is not satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Blocker {
    /// The id does not resolve to any task (deleted or never existed).
    Missing { id: TaskId },
    /// The prerequisite exists but is not completed yet.
    Incomplete { id: TaskId, status: TaskStatus },
}

impl Blocker {
    pub fn id(&self) -> &str {
        match self {
            Blocker::Missing { id } | Blocker::Incomplete { id, .. } => id,
        }
    }
}

/// Compute the lock map for a task collection (`true` = locked).
///
/// A task is unlocked iff every dependency id resolves to an existing task
/// whose status is `Completed`. An empty dependency list is unlocked. Missing
/// ids count as unsatisfied, so a task whose prerequisite was deleted stays
/// locked. Tasks caught in a dependency cycle can never satisfy each other and
/// therefore stay locked as well.
///
/// # Performance
///
/// O(V + E) with one hash lookup per dependency edge.
pub fn resolve_locks(tasks: &[Task]) -> BTreeMap<TaskId, bool> {
    let completed: HashMap<&str, bool> = tasks
        .iter()
        .map(|t| (t.id.as_str(), t.status.is_completed()))
        .collect();

    let locks: BTreeMap<TaskId, bool> = tasks
        .iter()
        .map(|task| {
            let locked = task
                .dependencies
                .iter()
                .any(|dep| !completed.get(dep.as_str()).copied().unwrap_or(false));
            (task.id.clone(), locked)
        })
        .collect();

    tracing::debug!(
        tasks = tasks.len(),
        locked = locks.values().filter(|l| **l).count(),
        "Resolved dependency locks"
    );
    locks
}

/// Lock state of a single task.
pub fn is_locked(task: &Task, tasks: &[Task]) -> bool {
    !unsatisfied_dependencies(task, tasks).is_empty()
}

/// Every prerequisite of `task` that is not satisfied, in declaration order.
pub fn unsatisfied_dependencies(task: &Task, tasks: &[Task]) -> Vec<Blocker> {
    let index: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();

    task.dependencies
        .iter()
        .filter_map(|dep| match index.get(dep.as_str()) {
            None => Some(Blocker::Missing { id: dep.clone() }),
            Some(prereq) if !prereq.status.is_completed() => Some(Blocker::Incomplete {
                id: dep.clone(),
                status: prereq.status,
            }),
            Some(_) => None,
        })
        .collect()
}

/// Check whether giving `task_id` the dependency list `proposed` would close a
/// cycle.
///
/// # Algorithm
///
/// Breadth-first walk starting from the proposed prerequisites, following
/// each visited task's existing dependencies. Reaching `task_id` means the
/// prerequisite (transitively) already depends on the task being edited.
/// The task's own current dependencies are ignored since `proposed` replaces
/// them.
pub fn would_create_cycle(tasks: &[Task], task_id: &str, proposed: &[TaskId]) -> bool {
    if proposed.iter().any(|d| d == task_id) {
        return true;
    }

    let graph: HashMap<&str, &[TaskId]> = tasks
        .iter()
        .filter(|t| t.id != task_id)
        .map(|t| (t.id.as_str(), t.dependencies.as_slice()))
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = proposed.iter().map(String::as_str).collect();

    while let Some(current) = queue.pop_front() {
        if current == task_id {
            return true;
        }
        if !seen.insert(current) {
            continue;
        }
        if let Some(deps) = graph.get(current) {
            queue.extend(deps.iter().map(String::as_str));
        }
    }

    false
}

/// Every dependency cycle present in the collection.
///
/// Returns each strongly connected component with more than one task, plus
/// every task that lists itself as a dependency. Members of a component are
/// returned in display order. Missing dependency ids are ignored.
pub fn find_cycles(tasks: &[Task]) -> Vec<Vec<TaskId>> {
    let id_to_idx: HashMap<&str, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.as_str(), i))
        .collect();

    let mut graph: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    for (idx, task) in tasks.iter().enumerate() {
        for dep in &task.dependencies {
            if let Some(&dep_idx) = id_to_idx.get(dep.as_str()) {
                graph[idx].push(dep_idx);
            }
        }
    }

    let mut cycles: Vec<Vec<TaskId>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || (scc.len() == 1 && graph[scc[0]].contains(&scc[0])))
        .map(|mut scc| {
            scc.sort_by(|&a, &b| crate::store::display_cmp(&tasks[a], &tasks[b]));
            scc.into_iter().map(|i| tasks[i].id.clone()).collect()
        })
        .collect();
    cycles.sort();

    if !cycles.is_empty() {
        tracing::warn!(cycles = cycles.len(), "Dependency cycles present; members stay locked");
    }
    cycles
}

/// Tarjan's algorithm for strongly connected components.
///
/// Returns a list of components, each a list of node indices.
pub fn tarjan_scc(graph: &[Vec<usize>]) -> Vec<Vec<usize>> {
    struct State {
        counter: usize,
        stack: Vec<usize>,
        on_stack: Vec<bool>,
        index: Vec<usize>,
        lowlink: Vec<usize>,
        result: Vec<Vec<usize>>,
    }

    fn strongconnect(v: usize, graph: &[Vec<usize>], st: &mut State) {
        st.index[v] = st.counter;
        st.lowlink[v] = st.counter;
        st.counter += 1;
        st.stack.push(v);
        st.on_stack[v] = true;

        for &w in &graph[v] {
            if st.index[w] == usize::MAX {
                strongconnect(w, graph, st);
                st.lowlink[v] = st.lowlink[v].min(st.lowlink[w]);
            } else if st.on_stack[w] {
                st.lowlink[v] = st.lowlink[v].min(st.index[w]);
            }
        }

        if st.lowlink[v] == st.index[v] {
            let mut component = Vec::new();
            while let Some(w) = st.stack.pop() {
                st.on_stack[w] = false;
                component.push(w);
                if w == v {
                    break;
                }
            }
            st.result.push(component);
        }
    }

    let n = graph.len();
    let mut st = State {
        counter: 0,
        stack: Vec::new(),
        on_stack: vec![false; n],
        index: vec![usize::MAX; n],
        lowlink: vec![0; n],
        result: Vec::new(),
    };

    for v in 0..n {
        if st.index[v] == usize::MAX {
            strongconnect(v, graph, &mut st);
        }
    }

    st.result
}

/// Chain dependencies sequentially: every task depends on the one before it.
///
/// Used by generation, where the flattened sequence runs week by week so the
/// first task of week N depends on the last task of week N-1.
pub fn chain_sequential(tasks: &mut [Task]) {
    for i in 1..tasks.len() {
        let prev = tasks[i - 1].id.clone();
        tasks[i].dependencies = vec![prev];
    }
    if let Some(first) = tasks.first_mut() {
        first.dependencies.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(id: &str, deps: &[&str], status: TaskStatus) -> Task {
        let mut t = Task::new("g", 1, id, Utc::now());
        t.id = id.to_string();
        t.dependencies = deps.iter().map(|d| d.to_string()).collect();
        t.status = status;
        t
    }

    #[test]
    fn test_no_dependencies_is_unlocked() {
        let tasks = vec![task("a", &[], TaskStatus::NotStarted)];
        assert!(!resolve_locks(&tasks)["a"]);
    }

    #[test]
    fn test_locked_until_all_prereqs_completed() {
        let mut tasks = vec![
            task("a", &[], TaskStatus::Completed),
            task("b", &[], TaskStatus::InProgress),
            task("c", &["a", "b"], TaskStatus::NotStarted),
        ];
        assert!(resolve_locks(&tasks)["c"]);

        tasks[1].status = TaskStatus::Completed;
        assert!(!resolve_locks(&tasks)["c"]);
    }

    #[test]
    fn test_missing_dependency_locks() {
        let tasks = vec![task("a2", &["b1"], TaskStatus::NotStarted)];
        assert!(resolve_locks(&tasks)["a2"]);
        assert_eq!(
            unsatisfied_dependencies(&tasks[0], &tasks),
            vec![Blocker::Missing { id: "b1".to_string() }]
        );
    }

    #[test]
    fn test_unsatisfied_reports_status() {
        let tasks = vec![
            task("a", &[], TaskStatus::InProgress),
            task("b", &["a"], TaskStatus::NotStarted),
        ];
        let blockers = unsatisfied_dependencies(&tasks[1], &tasks);
        assert_eq!(
            blockers,
            vec![Blocker::Incomplete {
                id: "a".to_string(),
                status: TaskStatus::InProgress
            }]
        );
        assert_eq!(blockers[0].id(), "a");
        assert!(is_locked(&tasks[1], &tasks));
    }

    #[test]
    fn test_would_create_cycle() {
        // c -> b -> a
        let tasks = vec![
            task("a", &[], TaskStatus::NotStarted),
            task("b", &["a"], TaskStatus::NotStarted),
            task("c", &["b"], TaskStatus::NotStarted),
        ];
        assert!(would_create_cycle(&tasks, "a", &["c".to_string()]));
        assert!(would_create_cycle(&tasks, "a", &["a".to_string()]));
        assert!(!would_create_cycle(&tasks, "c", &["a".to_string()]));
        assert!(!would_create_cycle(&tasks, "a", &["missing".to_string()]));
    }

    #[test]
    fn test_cycle_members_stay_locked() {
        let tasks = vec![
            task("a", &["b"], TaskStatus::NotStarted),
            task("b", &["a"], TaskStatus::NotStarted),
            task("c", &[], TaskStatus::NotStarted),
        ];
        let locks = resolve_locks(&tasks);
        assert!(locks["a"] && locks["b"]);
        assert!(!locks["c"]);

        let cycles = find_cycles(&tasks);
        assert_eq!(cycles.len(), 1);
        let mut members = cycles[0].clone();
        members.sort();
        assert_eq!(members, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_find_cycles_reports_self_loop() {
        let tasks = vec![task("a", &["a"], TaskStatus::NotStarted)];
        assert_eq!(find_cycles(&tasks), vec![vec!["a".to_string()]]);
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let tasks = vec![
            task("a", &[], TaskStatus::NotStarted),
            task("b", &["a"], TaskStatus::NotStarted),
            task("c", &["a", "b", "gone"], TaskStatus::NotStarted),
        ];
        assert!(find_cycles(&tasks).is_empty());
    }

    #[test]
    fn test_chain_sequential() {
        let mut tasks = vec![
            task("a", &["x"], TaskStatus::NotStarted),
            task("b", &[], TaskStatus::NotStarted),
            task("c", &[], TaskStatus::NotStarted),
        ];
        chain_sequential(&mut tasks);
        assert!(tasks[0].dependencies.is_empty());
        assert_eq!(tasks[1].dependencies, vec!["a".to_string()]);
        assert_eq!(tasks[2].dependencies, vec!["b".to_string()]);
    }
}
