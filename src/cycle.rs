//! Dependency cycle detection.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use crate::task::Task;

/// Whether making `task_id` depend on `proposed_dependency_id` would close a loop.
///
/// Walks the proposed dependency's existing predecessors transitively and
/// reports whether `task_id` is among them. Unknown ids and dangling references
/// simply end the walk.
pub fn would_create_cycle(tasks: &[Task], task_id: u64, proposed_dependency_id: u64) -> bool {
    let deps: HashMap<u64, &BTreeSet<u64>> = tasks.iter().map(|t| (t.id, &t.dependencies)).collect();

    let Some(start) = deps.get(&proposed_dependency_id) else {
        return false;
    };

    let mut stack: Vec<u64> = start.iter().copied().collect();
    let mut visited: HashSet<u64> = HashSet::new();

    while let Some(current) = stack.pop() {
        if current == task_id {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(next) = deps.get(&current) {
            stack.extend(next.iter().copied());
        }
    }
    false
}

/// The dependency cycles in a task collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Ids of tasks that sit on at least one dependency cycle.
    pub tasks: BTreeSet<u64>,
    /// `(dependency, dependent)` edges that close a cycle, sorted.
    pub edges: Vec<(u64, u64)>,
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids = self.tasks.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ");
        let edges = self
            .edges
            .iter()
            .map(|(from, to)| format!("{to} -> {from}"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "cycle through tasks [{ids}] via dependencies [{edges}]")
    }
}

impl CycleReport {
    /// Strongly connected components of the dependency graph that contain a cycle.
    ///
    /// Edge direction is dependency -> dependent, and edges whose source is not in
    /// `tasks` are dropped, matching [`DependencyGraph`](crate::graph::DependencyGraph).
    pub(crate) fn from_tasks(tasks: &[Task]) -> Self {
        let mut graph: DiGraphMap<u64, ()> = DiGraphMap::new();
        for t in tasks {
            graph.add_node(t.id);
        }
        for t in tasks {
            for &dep in &t.dependencies {
                if graph.contains_node(dep) {
                    graph.add_edge(dep, t.id, ());
                }
            }
        }

        let mut members = BTreeSet::new();
        let mut component_of: HashMap<u64, usize> = HashMap::new();
        for (i, component) in tarjan_scc(&graph).into_iter().enumerate() {
            let cyclic = component.len() > 1 || component.first().is_some_and(|&n| graph.contains_edge(n, n));
            if !cyclic {
                continue;
            }
            for n in component {
                members.insert(n);
                component_of.insert(n, i);
            }
        }

        let mut edges: Vec<(u64, u64)> = graph
            .all_edges()
            .filter(|(from, to, _)| {
                matches!((component_of.get(from), component_of.get(to)), (Some(a), Some(b)) if a == b)
            })
            .map(|(from, to, _)| (from, to))
            .collect();
        edges.sort_unstable();

        CycleReport { tasks: members, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Diagnostic check over a whole collection: `None` when the dependency graph is acyclic.
pub fn find_cycle(tasks: &[Task]) -> Option<CycleReport> {
    let report = CycleReport::from_tasks(tasks);
    (!report.is_empty()).then_some(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: u64, deps: &[u64]) -> Task {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut t = Task::new(id, format!("T{id}"), day, day);
        t.dependencies = deps.iter().copied().collect();
        t
    }

    // A depends on B, B depends on C.
    fn chain() -> Vec<Task> {
        vec![task(1, &[2]), task(2, &[3]), task(3, &[]), task(4, &[])]
    }

    #[test]
    fn closing_a_chain_is_a_cycle() {
        let tasks = chain();
        assert!(would_create_cycle(&tasks, 3, 1));
        assert!(would_create_cycle(&tasks, 3, 2));
    }

    #[test]
    fn unrelated_dependency_is_fine() {
        let tasks = chain();
        assert!(!would_create_cycle(&tasks, 3, 4));
        assert!(!would_create_cycle(&tasks, 1, 3));
        assert!(!would_create_cycle(&tasks, 3, 404));
    }

    #[test]
    fn walk_terminates_on_existing_cycle() {
        let tasks = vec![task(1, &[2]), task(2, &[1]), task(3, &[])];
        assert!(!would_create_cycle(&tasks, 3, 1));
    }

    #[test]
    fn find_cycle_reports_only_cycle_members() {
        assert!(find_cycle(&chain()).is_none());

        // 3 waits on the 1 <-> 2 loop but is not part of it.
        let tasks = vec![task(1, &[2]), task(2, &[1]), task(3, &[2]), task(4, &[])];
        let report = find_cycle(&tasks).expect("cycle");
        assert_eq!(report.tasks, BTreeSet::from([1, 2]));
        assert_eq!(report.edges, vec![(1, 2), (2, 1)]);
        assert!(report.to_string().contains("tasks [1, 2]"));
    }

    #[test]
    fn find_cycle_separates_independent_loops() {
        let tasks = vec![
            task(1, &[2]),
            task(2, &[1]),
            task(3, &[1]),
            task(4, &[5]),
            task(5, &[6]),
            task(6, &[4]),
        ];
        let report = find_cycle(&tasks).expect("cycle");
        assert_eq!(report.tasks, BTreeSet::from([1, 2, 4, 5, 6]));
        assert_eq!(report.edges, vec![(1, 2), (2, 1), (4, 6), (5, 4), (6, 5)]);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let tasks = vec![task(1, &[1]), task(2, &[1])];
        let report = find_cycle(&tasks).expect("cycle");
        assert_eq!(report.tasks, BTreeSet::from([1]));
        assert_eq!(report.edges, vec![(1, 1)]);
    }

    #[test]
    fn dangling_references_never_form_a_cycle() {
        assert!(find_cycle(&[task(1, &[9]), task(2, &[1])]).is_none());
    }
}
