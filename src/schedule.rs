//! Dependency-driven auto-scheduling.
//!
//! Leaf tasks are visited in topological order and pushed forward so that each
//! one starts the day after its latest predecessor ends. Tasks are only ever
//! moved later, never earlier, and keep their duration.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::cycle::CycleReport;
use crate::dates::{add_days, difference_in_days};
use crate::graph::DependencyGraph;
use crate::task::Task;

/// Result of a [`schedule`] pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// The pass ran; `shifted` lists the ids whose dates moved, in the order they moved.
    Applied { shifted: Vec<u64> },
    /// A dependency cycle stopped the pass before any date changed.
    Halted(CycleReport),
}

impl ScheduleOutcome {
    pub fn is_halted(&self) -> bool {
        matches!(self, ScheduleOutcome::Halted(_))
    }
}

/// Kahn's algorithm over the dependency edges of `tasks`.
///
/// The queue is seeded in slice order, so the result is deterministic. When
/// some tasks cannot be ordered, returns the cycles that block them.
pub fn topological_sort(tasks: &[Task]) -> Result<Vec<u64>, CycleReport> {
    let graph = DependencyGraph::build(tasks);
    let mut in_degree = graph.in_degrees();

    let mut queue: VecDeque<u64> = graph
        .ids()
        .iter()
        .copied()
        .filter(|id| in_degree.get(id).copied().unwrap_or(0) == 0)
        .collect();

    let mut sorted = Vec::with_capacity(graph.len());
    while let Some(u) = queue.pop_front() {
        sorted.push(u);
        for &v in graph.dependents_of(u) {
            if let Some(d) = in_degree.get_mut(&v) {
                *d = d.saturating_sub(1);
                if *d == 0 {
                    queue.push_back(v);
                }
            }
        }
    }

    if sorted.len() != graph.len() {
        return Err(CycleReport::from_tasks(tasks));
    }
    Ok(sorted)
}

/// Push dependent leaf tasks past their predecessors' end dates.
///
/// On a dependency cycle the whole pass is abandoned and no task is touched.
pub fn schedule(tasks: &mut [Task]) -> ScheduleOutcome {
    let order = match topological_sort(tasks) {
        Ok(order) => order,
        Err(report) => {
            warn!(%report, "circular dependency detected; auto-scheduling halted");
            return ScheduleOutcome::Halted(report);
        }
    };

    let parents: HashSet<u64> = tasks.iter().filter_map(|t| t.parent_id).collect();
    let index: HashMap<u64, usize> = tasks.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

    let mut shifted = Vec::new();
    for id in order {
        if parents.contains(&id) {
            continue;
        }
        let Some(&i) = index.get(&id) else { continue };
        if tasks[i].dependencies.is_empty() {
            continue;
        }

        let latest: Option<NaiveDate> = tasks[i]
            .dependencies
            .iter()
            .filter_map(|dep| index.get(dep))
            .map(|&j| tasks[j].end_date)
            .max();
        let Some(latest) = latest else { continue };

        let earliest_start = add_days(latest, 1);
        let task = &mut tasks[i];
        if earliest_start > task.start_date {
            let span = difference_in_days(task.start_date, task.end_date);
            debug!(
                task = task.id,
                from = %task.start_date,
                to = %earliest_start,
                "shifting task past its predecessors"
            );
            task.start_date = earliest_start;
            task.end_date = add_days(earliest_start, span);
            shifted.push(task.id);
        }
    }

    ScheduleOutcome::Applied { shifted }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date;
    use proptest::prelude::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn task(id: u64, start: &str, end: &str, deps: &[u64]) -> Task {
        let mut t = Task::new(id, format!("T{id}"), d(start), d(end));
        t.dependencies = deps.iter().copied().collect();
        t
    }

    #[test]
    fn successor_starts_the_day_after_predecessor_ends() {
        let mut tasks = vec![
            task(1, "2024-01-01", "2024-01-10", &[]),
            task(2, "2024-01-05", "2024-01-06", &[1]),
        ];
        let outcome = schedule(&mut tasks);
        assert_eq!(outcome, ScheduleOutcome::Applied { shifted: vec![2] });
        assert_eq!(tasks[1].start_date, d("2024-01-11"));
        assert_eq!(tasks[1].end_date, d("2024-01-12"));
    }

    #[test]
    fn tasks_already_late_enough_are_untouched() {
        let mut tasks = vec![
            task(1, "2024-01-01", "2024-01-10", &[]),
            task(2, "2024-02-01", "2024-02-03", &[1]),
        ];
        let before = tasks.clone();
        assert_eq!(schedule(&mut tasks), ScheduleOutcome::Applied { shifted: vec![] });
        assert_eq!(tasks, before);
    }

    #[test]
    fn shifts_propagate_down_a_chain_in_one_pass() {
        // Listed out of order to make sure the topological order is what drives it.
        let mut tasks = vec![
            task(3, "2024-01-01", "2024-01-01", &[2]),
            task(2, "2024-01-01", "2024-01-03", &[1]),
            task(1, "2024-01-01", "2024-01-05", &[]),
        ];
        schedule(&mut tasks);
        assert_eq!(tasks[1].start_date, d("2024-01-06"));
        assert_eq!(tasks[1].end_date, d("2024-01-08"));
        assert_eq!(tasks[0].start_date, d("2024-01-09"));
        assert_eq!(tasks[0].end_date, d("2024-01-09"));
    }

    #[test]
    fn latest_of_several_predecessors_wins() {
        let mut tasks = vec![
            task(1, "2024-01-01", "2024-01-04", &[]),
            task(2, "2024-01-01", "2024-01-09", &[]),
            task(3, "2024-01-01", "2024-01-02", &[1, 2]),
        ];
        schedule(&mut tasks);
        assert_eq!(tasks[2].start_date, d("2024-01-10"));
        assert_eq!(tasks[2].end_date, d("2024-01-11"));
    }

    #[test]
    fn parent_tasks_are_not_scheduled() {
        let parent = task(2, "2024-01-01", "2024-01-02", &[1]);
        let mut child = task(3, "2024-01-01", "2024-01-02", &[]);
        child.parent_id = Some(2);
        let mut tasks = vec![task(1, "2024-01-01", "2024-01-10", &[]), parent, child];
        assert_eq!(schedule(&mut tasks), ScheduleOutcome::Applied { shifted: vec![] });
        assert_eq!(tasks[1].start_date, d("2024-01-01"));
    }

    #[test]
    fn dangling_dependencies_are_ignored() {
        let mut tasks = vec![task(1, "2024-01-01", "2024-01-02", &[77])];
        assert_eq!(schedule(&mut tasks), ScheduleOutcome::Applied { shifted: vec![] });
        assert_eq!(tasks[0].start_date, d("2024-01-01"));
    }

    #[test]
    fn cycle_halts_without_touching_dates() {
        let mut tasks = vec![
            task(1, "2024-01-01", "2024-01-10", &[]),
            task(2, "2024-01-01", "2024-01-02", &[1, 3]),
            task(3, "2024-01-01", "2024-01-02", &[2]),
        ];
        let before = tasks.clone();
        let outcome = schedule(&mut tasks);
        assert!(outcome.is_halted());
        assert_eq!(tasks, before);
    }

    #[test]
    fn halt_names_the_loop_not_its_downstream_tasks() {
        let mut tasks = vec![
            task(1, "2024-01-01", "2024-01-02", &[2]),
            task(2, "2024-01-01", "2024-01-02", &[1]),
            task(3, "2024-01-01", "2024-01-02", &[2]),
        ];
        let ScheduleOutcome::Halted(report) = schedule(&mut tasks) else {
            panic!("expected a halted pass");
        };
        assert_eq!(report.tasks.into_iter().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(report.edges, vec![(1, 2), (2, 1)]);
    }

    #[test]
    fn topological_sort_orders_every_task() {
        let tasks = vec![
            task(1, "2024-01-01", "2024-01-01", &[3]),
            task(2, "2024-01-01", "2024-01-01", &[]),
            task(3, "2024-01-01", "2024-01-01", &[2]),
        ];
        assert_eq!(topological_sort(&tasks).unwrap(), vec![2, 3, 1]);
    }

    // Random acyclic collections: task i may only depend on tasks with a smaller index.
    fn acyclic_tasks(max: usize) -> impl Strategy<Value = Vec<Task>> {
        proptest::collection::vec(
            (0i64..60, 0i64..10, proptest::collection::vec(any::<usize>(), 0..4)),
            1..=max,
        )
        .prop_map(|rows| {
            let base = d("2024-01-01");
            rows.into_iter()
                .enumerate()
                .map(|(i, (offset, span, raw_deps))| {
                    let start = add_days(base, offset);
                    let mut t = Task::new(i as u64 + 1, format!("T{i}"), start, add_days(start, span));
                    if i > 0 {
                        t.dependencies = raw_deps.into_iter().map(|r| (r % i) as u64 + 1).collect();
                    }
                    t
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn schedule_is_idempotent(mut tasks in acyclic_tasks(12)) {
            prop_assert!(!schedule(&mut tasks).is_halted());
            let settled = tasks.clone();
            prop_assert_eq!(schedule(&mut tasks), ScheduleOutcome::Applied { shifted: vec![] });
            prop_assert_eq!(tasks, settled);
        }

        #[test]
        fn schedule_satisfies_every_dependency(mut tasks in acyclic_tasks(12)) {
            let spans: Vec<i64> = tasks.iter().map(|t| difference_in_days(t.start_date, t.end_date)).collect();
            schedule(&mut tasks);
            let ends: HashMap<u64, NaiveDate> = tasks.iter().map(|t| (t.id, t.end_date)).collect();
            for (t, span) in tasks.iter().zip(spans) {
                prop_assert_eq!(difference_in_days(t.start_date, t.end_date), span);
                for dep in &t.dependencies {
                    prop_assert!(t.start_date > ends[dep]);
                }
            }
        }
    }
}
