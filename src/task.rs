//! Task data structure and related functionality.
//!
//! This module defines the core `Task` struct: a dated work item that can be
//! nested under a parent and can depend on other tasks finishing first.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::difference_in_days;
use crate::fields::StatusSetting;

/// A scheduled work item.
///
/// Parent tasks (tasks that some other task names as `parent_id`) have their
/// dates and completion owned by the rollup; only leaf tasks are moved by the
/// dependency scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub parent_id: Option<u64>,
    pub percent_complete: u8,
    /// Finish-to-start predecessors.
    #[serde(default)]
    pub dependencies: BTreeSet<u64>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: StatusSetting,
    /// Values for the store's user-defined columns, keyed by column name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, String>,
}

impl Task {
    /// Create a top-level leaf task with automatic status and no dependencies.
    pub fn new(id: u64, name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Task {
            id,
            name: name.into(),
            description: None,
            start_date,
            end_date,
            parent_id: None,
            percent_complete: 0,
            dependencies: BTreeSet::new(),
            resources: Vec::new(),
            notes: None,
            status: StatusSetting::Auto,
            custom_fields: BTreeMap::new(),
        }
    }

    /// Inclusive length in days (a task starting and ending on the same day lasts 1).
    pub fn duration_days(&self) -> i64 {
        difference_in_days(self.start_date, self.end_date) + 1
    }

    pub fn is_complete(&self) -> bool {
        self.percent_complete >= 100
    }
}

/// A partial edit of a task. `None` fields are left as they are.
///
/// The whole edit is validated before any field is written, so a rejected
/// update leaves the task untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    /// `Some(None)` moves the task to the top level.
    pub parent_id: Option<Option<u64>>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Clamped into 0..=100 at commit.
    pub percent_complete: Option<i64>,
    pub dependencies: Option<BTreeSet<u64>>,
    pub resources: Option<Vec<String>>,
    pub notes: Option<String>,
    pub status: Option<StatusSetting>,
    /// Merged into the task's values; an empty value removes the key.
    pub custom_fields: Option<BTreeMap<String, String>>,
}

impl TaskUpdate {
    pub fn touches_dates(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}
