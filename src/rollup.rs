//! Hierarchy rollup: parent dates and completion derived from their children.
//!
//! A grandparent's span depends on its parent's span, which depends on the
//! parent's own children, so passes are repeated until one changes nothing.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::graph::build_children_map;
use crate::task::Task;

/// What a [`rollup`] call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollupReport {
    /// Passes run, including the final pass that changed nothing.
    pub passes: usize,
    /// Parent tasks whose span or completion changed.
    pub changed: BTreeSet<u64>,
    /// False when the pass limit was hit before reaching a fixed point.
    pub converged: bool,
}

/// Round-half-up of `weighted / total` for non-negative integers.
fn round_div(weighted: i64, total: i64) -> i64 {
    (2 * weighted + total) / (2 * total)
}

/// Duration-weighted average completion of `tasks`.
///
/// Each task weighs its inclusive length in days; tasks with non-positive
/// length are left out, and an empty total yields 0.
pub fn weighted_completion<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> u8 {
    let mut weighted = 0i64;
    let mut total = 0i64;
    for t in tasks {
        let duration = t.duration_days();
        if duration > 0 {
            weighted += i64::from(t.percent_complete) * duration;
            total += duration;
        }
    }
    if total == 0 {
        return 0;
    }
    round_div(weighted, total).clamp(0, 100) as u8
}

/// Recompute every parent task's span and completion until nothing changes.
pub fn rollup(tasks: &mut [Task]) -> RollupReport {
    let child_map = build_children_map(tasks);
    let index: HashMap<u64, usize> = tasks.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

    // Parents in slice order, each with the slice positions of its children.
    let families: Vec<(usize, Vec<usize>)> = tasks
        .iter()
        .enumerate()
        .filter_map(|(i, t)| {
            let children = child_map.get(&t.id)?;
            let positions: Vec<usize> = children.iter().filter_map(|c| index.get(c).copied()).collect();
            (!positions.is_empty()).then_some((i, positions))
        })
        .collect();

    let mut report = RollupReport::default();
    let limit = tasks.len() + 2;

    loop {
        report.passes += 1;
        let mut changed = false;

        for (parent, children) in &families {
            let start = children.iter().map(|&c| tasks[c].start_date).min();
            let end = children.iter().map(|&c| tasks[c].end_date).max();
            let percent = weighted_completion(children.iter().map(|&c| &tasks[c]));

            let (Some(start), Some(end)) = (start, end) else { continue };
            let task = &mut tasks[*parent];
            if task.start_date != start || task.end_date != end || task.percent_complete != percent {
                debug!(
                    task = task.id,
                    %start,
                    %end,
                    percent,
                    "rolling up parent task"
                );
                task.start_date = start;
                task.end_date = end;
                task.percent_complete = percent;
                report.changed.insert(task.id);
                changed = true;
            }
        }

        if !changed {
            report.converged = true;
            break;
        }
        if report.passes >= limit {
            warn!(passes = report.passes, "rollup did not converge; parent links may form a cycle");
            break;
        }
    }

    report
}

/// Project-wide completion: the weighted average over top-level tasks.
pub fn overall_progress(tasks: &[Task]) -> u8 {
    weighted_completion(tasks.iter().filter(|t| t.parent_id.is_none()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::{add_days, difference_in_days, parse_date};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn task(id: u64, parent: Option<u64>, start: &str, end: &str, pct: u8) -> Task {
        let mut t = Task::new(id, format!("T{id}"), d(start), d(end));
        t.parent_id = parent;
        t.percent_complete = pct;
        t
    }

    #[test]
    fn parent_takes_span_and_weighted_completion() {
        let mut tasks = vec![
            task(1, None, "2024-03-01", "2024-03-01", 0),
            task(2, Some(1), "2024-01-01", "2024-01-02", 50),
            task(3, Some(1), "2024-01-03", "2024-01-05", 20),
        ];
        let report = rollup(&mut tasks);
        assert_eq!(tasks[0].start_date, d("2024-01-01"));
        assert_eq!(tasks[0].end_date, d("2024-01-05"));
        assert_eq!(tasks[0].percent_complete, 32);
        assert_eq!(report.changed, BTreeSet::from([1]));
        assert!(report.converged);
    }

    #[test]
    fn halves_round_up() {
        // (75*1 + 0*1) / 2 = 37.5 -> 38
        let mut tasks = vec![
            task(1, None, "2024-01-01", "2024-01-01", 0),
            task(2, Some(1), "2024-01-01", "2024-01-01", 75),
            task(3, Some(1), "2024-01-02", "2024-01-02", 0),
        ];
        rollup(&mut tasks);
        assert_eq!(tasks[0].percent_complete, 38);
    }

    #[test]
    fn three_levels_reach_fixed_point() {
        // Grandparent listed before parent so a single pass would leave it stale.
        let mut tasks = vec![
            task(1, None, "2030-01-01", "2030-01-01", 0),
            task(2, Some(1), "2030-01-01", "2030-01-01", 0),
            task(3, Some(2), "2024-01-01", "2024-01-04", 100),
            task(4, Some(2), "2024-01-05", "2024-01-08", 0),
            task(5, Some(1), "2024-01-09", "2024-01-10", 100),
        ];
        let report = rollup(&mut tasks);
        assert!(report.passes >= 2);
        assert_eq!(tasks[1].start_date, d("2024-01-01"));
        assert_eq!(tasks[1].end_date, d("2024-01-08"));
        assert_eq!(tasks[1].percent_complete, 50);
        assert_eq!(tasks[0].start_date, d("2024-01-01"));
        assert_eq!(tasks[0].end_date, d("2024-01-10"));
        // (50*8 + 100*2) / 10 = 60
        assert_eq!(tasks[0].percent_complete, 60);

        let again = rollup(&mut tasks);
        assert_eq!(again.passes, 1);
        assert!(again.changed.is_empty());
    }

    #[test]
    fn leaves_and_dangling_parents_are_untouched() {
        let mut tasks = vec![task(1, Some(99), "2024-01-01", "2024-01-02", 10)];
        let before = tasks.clone();
        rollup(&mut tasks);
        assert_eq!(tasks, before);
    }

    #[test]
    fn inverted_child_counts_for_span_but_not_weight() {
        // Child 3 ends before it starts (-1 days), as a hand-edited file might.
        let mut tasks = vec![
            task(1, None, "2024-03-01", "2024-03-01", 0),
            task(2, Some(1), "2024-01-01", "2024-01-02", 50),
            task(3, Some(1), "2024-01-10", "2024-01-08", 100),
        ];
        assert!(tasks[2].duration_days() <= 0);
        rollup(&mut tasks);
        assert_eq!(tasks[0].start_date, d("2024-01-01"));
        assert_eq!(tasks[0].end_date, d("2024-01-08"));
        assert_eq!(tasks[0].percent_complete, 50);
    }

    #[test]
    fn zero_total_duration_gives_zero() {
        assert_eq!(weighted_completion(std::iter::empty()), 0);
    }

    #[test]
    fn overall_progress_weights_top_level_tasks() {
        let tasks = vec![
            task(1, None, "2024-01-01", "2024-01-04", 100),
            task(2, None, "2024-01-05", "2024-01-05", 0),
            task(3, Some(1), "2024-01-01", "2024-01-04", 100),
        ];
        assert_eq!(overall_progress(&tasks), 80);
    }

    #[test]
    fn corrupted_parent_cycle_stops_at_pass_limit() {
        let mut tasks = vec![
            task(1, Some(2), "2024-01-01", "2024-01-02", 0),
            task(2, Some(1), "2024-01-03", "2024-01-04", 0),
        ];
        let report = rollup(&mut tasks);
        assert!(report.passes <= tasks.len() + 2);
    }

    // A random forest: task i may only be nested under a task with a smaller index.
    fn forest(max: usize) -> impl Strategy<Value = Vec<Task>> {
        proptest::collection::vec((any::<Option<usize>>(), 0i64..40, 0i64..6, 0u8..=100), 1..=max).prop_map(
            |rows| {
                let base = d("2024-01-01");
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (parent, offset, span, pct))| {
                        let start = add_days(base, offset);
                        let mut t = Task::new(i as u64 + 1, format!("T{i}"), start, add_days(start, span));
                        t.percent_complete = pct;
                        if i > 0 {
                            t.parent_id = parent.map(|p| (p % i) as u64 + 1);
                        }
                        t
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn rollup_converges_to_the_invariants(mut tasks in forest(16)) {
            let report = rollup(&mut tasks);
            prop_assert!(report.converged);

            let map = build_children_map(&tasks);
            let by_id: HashMap<u64, &Task> = tasks.iter().map(|t| (t.id, t)).collect();
            for (parent, children) in &map {
                let p = by_id[parent];
                let kids: Vec<&Task> = children.iter().map(|c| by_id[c]).collect();
                prop_assert_eq!(p.start_date, kids.iter().map(|k| k.start_date).min().unwrap());
                prop_assert_eq!(p.end_date, kids.iter().map(|k| k.end_date).max().unwrap());
                prop_assert_eq!(p.percent_complete, weighted_completion(kids.iter().copied()));
                prop_assert!(difference_in_days(p.start_date, p.end_date) >= 0);
            }
        }
    }
}
