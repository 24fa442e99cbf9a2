//! Crate-wide error type and result alias.
//!
//! Every rejection at the edit boundary surfaces as a [`PlanError`] before any
//! state is committed. A dependency cycle found while scheduling is *not* an
//! error: it halts the pass and is reported through
//! [`ScheduleOutcome::Halted`](crate::schedule::ScheduleOutcome).

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Task not found: {0}")]
    TaskNotFound(u64),

    #[error("Task name cannot be empty")]
    EmptyName,

    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Circular dependency: task {dependency} already depends on task {task}")]
    CycleDetected { task: u64, dependency: u64 },

    #[error("Task {0} cannot depend on itself")]
    SelfDependency(u64),

    #[error("Task {task} cannot depend on its own descendant {dependency}")]
    DescendantDependency { task: u64, dependency: u64 },

    #[error("Subtask {0} cannot carry manual dependencies")]
    SubtaskDependencies(u64),

    #[error("Setting parent {parent} on task {task} would create a cycle")]
    ParentCycle { task: u64, parent: u64 },

    #[error("The {field} of parent task {task} is calculated from its children")]
    DerivedField { task: u64, field: &'static str },

    #[error("Invalid custom field name '{0}'")]
    InvalidFieldName(String),

    #[error("Custom field '{0}' already exists")]
    DuplicateField(String),

    #[error("Unknown custom field '{0}'")]
    UnknownField(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlanError>;
