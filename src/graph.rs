//! Graph structures over a task collection.
//!
//! Two relations live on a task list: parent/child nesting and
//! finish-to-start dependencies. This module builds lookup structures for both
//! once per call so the walks elsewhere can stay iterative.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::task::Task;

/// Dependency edges restricted to a set of tasks.
///
/// Edges point from a predecessor to its dependents. A dependency reference to
/// an id that is not part of the slice the graph was built from is ignored.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    order: Vec<u64>,
    adjacency: HashMap<u64, Vec<u64>>,
    in_degree: HashMap<u64, usize>,
}

impl DependencyGraph {
    pub fn build(tasks: &[Task]) -> Self {
        let mut order = Vec::with_capacity(tasks.len());
        let mut adjacency: HashMap<u64, Vec<u64>> = HashMap::with_capacity(tasks.len());
        let mut in_degree: HashMap<u64, usize> = HashMap::with_capacity(tasks.len());

        for t in tasks {
            if adjacency.insert(t.id, Vec::new()).is_none() {
                order.push(t.id);
            }
            in_degree.insert(t.id, 0);
        }

        for t in tasks {
            for dep in &t.dependencies {
                if let Some(dependents) = adjacency.get_mut(dep) {
                    dependents.push(t.id);
                    *in_degree.entry(t.id).or_default() += 1;
                }
            }
        }

        DependencyGraph {
            order,
            adjacency,
            in_degree,
        }
    }

    /// Task ids in the order they appeared in the source slice.
    pub fn ids(&self) -> &[u64] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tasks that depend directly on `id`.
    pub fn dependents_of(&self, id: u64) -> &[u64] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of in-slice predecessors of `id`.
    pub fn in_degree(&self, id: u64) -> usize {
        self.in_degree.get(&id).copied().unwrap_or(0)
    }

    pub(crate) fn in_degrees(&self) -> HashMap<u64, usize> {
        self.in_degree.clone()
    }
}

/// Build a map of parent task IDs to their children's IDs.
pub fn build_children_map(tasks: &[Task]) -> BTreeMap<u64, Vec<u64>> {
    let mut map: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    for t in tasks {
        if let Some(p) = t.parent_id {
            map.entry(p).or_default().push(t.id);
        }
    }
    for v in map.values_mut() {
        v.sort_unstable();
    }
    map
}

/// Whether any task names `id` as its parent.
pub fn is_parent(tasks: &[Task], id: u64) -> bool {
    tasks.iter().any(|t| t.parent_id == Some(id))
}

/// Collect all descendant task IDs below `root` (not including `root`).
pub fn collect_descendants(root: u64, child_map: &BTreeMap<u64, Vec<u64>>) -> HashSet<u64> {
    let mut out = HashSet::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if let Some(children) = child_map.get(&id) {
            for &c in children {
                if c != root && out.insert(c) {
                    stack.push(c);
                }
            }
        }
    }
    out
}

/// Collect the ancestor chain of `id`, closest first.
///
/// Stops at a missing parent or when a corrupted parent chain revisits a task.
pub fn collect_ancestors(id: u64, tasks: &[Task]) -> Vec<u64> {
    let parents: HashMap<u64, Option<u64>> = tasks.iter().map(|t| (t.id, t.parent_id)).collect();
    let mut chain = Vec::new();
    let mut seen = HashSet::from([id]);
    let mut cur = parents.get(&id).copied().flatten();
    while let Some(p) = cur {
        if !seen.insert(p) {
            break;
        }
        chain.push(p);
        cur = parents.get(&p).copied().flatten();
    }
    chain
}

/// Depth of every task in the parent forest (top-level tasks are 0).
pub fn depth_map(tasks: &[Task]) -> HashMap<u64, usize> {
    tasks
        .iter()
        .map(|t| (t.id, collect_ancestors(t.id, tasks).len()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: u64, parent: Option<u64>, deps: &[u64]) -> Task {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut t = Task::new(id, format!("T{id}"), day, day);
        t.parent_id = parent;
        t.dependencies = deps.iter().copied().collect();
        t
    }

    #[test]
    fn adjacency_points_from_predecessor_to_dependent() {
        let tasks = vec![task(1, None, &[]), task(2, None, &[1]), task(3, None, &[1, 2])];
        let g = DependencyGraph::build(&tasks);
        assert_eq!(g.ids(), &[1, 2, 3]);
        assert_eq!(g.dependents_of(1), &[2, 3]);
        assert_eq!(g.dependents_of(2), &[3]);
        assert_eq!(g.in_degree(1), 0);
        assert_eq!(g.in_degree(3), 2);
    }

    #[test]
    fn dangling_dependencies_are_ignored() {
        let tasks = vec![task(1, None, &[99]), task(2, None, &[1, 42])];
        let g = DependencyGraph::build(&tasks);
        assert_eq!(g.in_degree(1), 0);
        assert_eq!(g.in_degree(2), 1);
        assert!(g.dependents_of(99).is_empty());
    }

    #[test]
    fn subset_only_counts_present_sources() {
        let tasks = vec![task(1, None, &[]), task(2, None, &[1]), task(3, None, &[2])];
        let g = DependencyGraph::build(&tasks[1..]);
        assert_eq!(g.len(), 2);
        assert_eq!(g.in_degree(2), 0);
        assert_eq!(g.in_degree(3), 1);
    }

    #[test]
    fn descendants_and_ancestors() {
        let tasks = vec![
            task(1, None, &[]),
            task(2, Some(1), &[]),
            task(3, Some(2), &[]),
            task(4, Some(2), &[]),
            task(5, None, &[]),
        ];
        let map = build_children_map(&tasks);
        let desc = collect_descendants(1, &map);
        assert_eq!(desc, HashSet::from([2, 3, 4]));
        assert!(collect_descendants(5, &map).is_empty());
        assert_eq!(collect_ancestors(4, &tasks), vec![2, 1]);
        assert!(is_parent(&tasks, 2));
        assert!(!is_parent(&tasks, 3));
        assert_eq!(depth_map(&tasks)[&3], 2);
    }

    #[test]
    fn ancestor_walk_survives_corrupted_parent_cycle() {
        let tasks = vec![task(1, Some(2), &[]), task(2, Some(1), &[])];
        assert_eq!(collect_ancestors(1, &tasks), vec![2]);
        let map = build_children_map(&tasks);
        assert_eq!(collect_descendants(1, &map), HashSet::from([2]));
    }
}
