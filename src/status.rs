//! Status classification and deadline alerts.
//!
//! Status is derived on read: a task whose stored setting is `auto` is
//! classified from its completion and how close its end date is to today.

use chrono::NaiveDate;

use crate::dates::add_days;
use crate::fields::{Status, StatusSetting};
use crate::task::Task;

/// Days before the end date in which an unfinished task counts as due soon.
pub const AT_RISK_WINDOW_DAYS: i64 = 3;
/// Completion at or above which a task due soon is still on track.
pub const AT_RISK_COMPLETION: u8 = 75;
/// Default look-ahead for [`upcoming`].
pub const DEFAULT_UPCOMING_DAYS: i64 = 7;

/// Classify a task from its completion and end date.
pub fn calculated_status(task: &Task, today: NaiveDate) -> Status {
    if task.percent_complete == 100 {
        return Status::Complete;
    }
    if task.end_date < today {
        return Status::Delayed;
    }
    if task.end_date <= add_days(today, AT_RISK_WINDOW_DAYS) && task.percent_complete < AT_RISK_COMPLETION {
        return Status::AtRisk;
    }
    Status::OnTrack
}

/// The status to display: the pinned value, or the calculated one for `auto`.
pub fn effective_status(task: &Task, today: NaiveDate) -> Status {
    match task.status {
        StatusSetting::Explicit(s) => s,
        StatusSetting::Auto => calculated_status(task, today),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Overdue,
    DueSoon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub task_id: u64,
    pub message: String,
}

/// Alerts for unfinished tasks that are past due or due within the at-risk window.
pub fn notifications(tasks: &[Task], today: NaiveDate) -> Vec<Notification> {
    let soon = add_days(today, AT_RISK_WINDOW_DAYS);
    tasks
        .iter()
        .filter(|t| !t.is_complete())
        .filter_map(|t| {
            if t.end_date < today {
                Some(Notification {
                    kind: NotificationKind::Overdue,
                    task_id: t.id,
                    message: format!("Overdue: \"{}\" was due on {}.", t.name, t.end_date),
                })
            } else if t.end_date <= soon {
                Some(Notification {
                    kind: NotificationKind::DueSoon,
                    task_id: t.id,
                    message: format!("Due soon: \"{}\" is due on {}.", t.name, t.end_date),
                })
            } else {
                None
            }
        })
        .collect()
}

/// Unfinished tasks whose end date falls within `[today, today + days]`.
pub fn upcoming(tasks: &[Task], today: NaiveDate, days: i64) -> Vec<&Task> {
    let horizon = add_days(today, days);
    tasks
        .iter()
        .filter(|t| !t.is_complete() && t.end_date >= today && t.end_date <= horizon)
        .collect()
}

/// Overdue tasks first, then the remaining tasks whose calculated status is at risk.
pub fn at_risk_and_overdue(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    let overdue = tasks.iter().filter(|t| !t.is_complete() && t.end_date < today);
    let at_risk = tasks
        .iter()
        .filter(|t| t.end_date >= today && calculated_status(t, today) == Status::AtRisk);
    overdue.chain(at_risk).collect()
}

/// Tasks that start and end on the same day.
pub fn milestones(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|t| t.start_date == t.end_date).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn task(id: u64, end: &str, pct: u8) -> Task {
        let mut t = Task::new(id, format!("T{id}"), d("2024-01-01"), d(end));
        t.percent_complete = pct;
        t
    }

    #[test]
    fn complete_wins_over_overdue() {
        let today = d("2024-06-01");
        assert_eq!(calculated_status(&task(1, "2024-01-05", 100), today), Status::Complete);
        assert_eq!(calculated_status(&task(1, "2024-01-05", 99), today), Status::Delayed);
    }

    #[test]
    fn at_risk_boundary() {
        let today = d("2024-06-01");
        let due = "2024-06-04";
        assert_eq!(calculated_status(&task(1, due, 74), today), Status::AtRisk);
        assert_eq!(calculated_status(&task(1, due, 75), today), Status::OnTrack);
        assert_eq!(calculated_status(&task(1, "2024-06-05", 0), today), Status::OnTrack);
        assert_eq!(calculated_status(&task(1, "2024-06-01", 10), today), Status::AtRisk);
    }

    #[test]
    fn explicit_status_bypasses_classification() {
        let today = d("2024-06-01");
        let mut t = task(1, "2024-01-05", 0);
        assert_eq!(effective_status(&t, today), Status::Delayed);
        t.status = StatusSetting::Explicit(Status::OnTrack);
        assert_eq!(effective_status(&t, today), Status::OnTrack);
    }

    #[test]
    fn notifications_cover_overdue_and_due_soon() {
        let today = d("2024-06-01");
        let tasks = vec![
            task(1, "2024-05-30", 20),
            task(2, "2024-06-03", 90),
            task(3, "2024-06-20", 0),
            task(4, "2024-05-01", 100),
        ];
        let notes = notifications(&tasks, today);
        assert_eq!(notes.len(), 2);
        assert_eq!((notes[0].kind, notes[0].task_id), (NotificationKind::Overdue, 1));
        assert_eq!((notes[1].kind, notes[1].task_id), (NotificationKind::DueSoon, 2));
        assert!(notes[0].message.contains("2024-05-30"));
    }

    fn ids(v: Vec<&Task>) -> Vec<u64> {
        v.iter().map(|t| t.id).collect()
    }

    #[test]
    fn report_lists() {
        let today = d("2024-06-01");
        let mut milestone = task(5, "2024-01-01", 0);
        milestone.start_date = milestone.end_date;
        let tasks = vec![
            task(1, "2024-05-30", 20),
            task(2, "2024-06-03", 10),
            task(3, "2024-06-07", 0),
            task(4, "2024-06-09", 0),
            milestone,
        ];
        assert_eq!(ids(at_risk_and_overdue(&tasks, today)), vec![1, 5, 2]);
        assert_eq!(ids(upcoming(&tasks, today, DEFAULT_UPCOMING_DAYS)), vec![2, 3]);
        assert_eq!(ids(milestones(&tasks)), vec![5]);
    }
}
