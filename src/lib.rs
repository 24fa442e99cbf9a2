//! # plan_schedule
//!
//! Scheduling engine for a Gantt-style project plan.
//!
//! A plan is a flat list of [`Task`](task::Task)s linked two ways: parent/child
//! nesting and finish-to-start dependencies. After every committed edit the
//! engine restores two fixed points:
//!
//! - **Auto-scheduling** ([`schedule`]): each leaf task starts no earlier than
//!   the day after its latest predecessor ends. A dependency cycle halts the
//!   pass and is reported instead of looping.
//! - **Rollup** ([`rollup`]): each parent spans its children and carries
//!   their duration-weighted completion.
//!
//! Status is classified on read ([`status`]) from completion and the distance
//! to the end date, unless the user pinned one.
//!
//! [`db::TaskStore`] is the edit boundary that validates mutations and keeps
//! both fixed points after each one; the `plan` binary is a thin CLI on top.

pub mod cycle;
pub mod dates;
pub mod db;
pub mod errors;
pub mod export;
pub mod fields;
pub mod graph;
pub mod logging;
pub mod rollup;
pub mod schedule;
pub mod status;
pub mod task;

pub use db::{NewTask, Recalculation, TaskStore, Variance};
pub use errors::{PlanError, Result};
pub use task::{Task, TaskUpdate};
