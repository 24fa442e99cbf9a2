//! Task store: the owned task collection and every committed mutation.
//!
//! `TaskStore` is the edit boundary. Each mutation validates its input first,
//! commits only when every check passes, and then alternates the dependency
//! scheduler and the hierarchy rollup until neither changes anything, so the
//! collection is back at its fixed point before anyone reads it again.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cycle::would_create_cycle;
use crate::dates::{difference_in_days, try_add_days};
use crate::errors::{PlanError, Result};
use crate::fields::{CustomField, Handle};
use crate::graph::{build_children_map, collect_ancestors, collect_descendants, is_parent};
use crate::rollup::{rollup, RollupReport};
use crate::schedule::{schedule, ScheduleOutcome};
use crate::task::{Task, TaskUpdate};

fn first_task_id() -> u64 {
    1
}

/// In-memory store for a project's tasks.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStore {
    pub tasks: Vec<Task>,
    /// Next id to hand out; only ever grows, so deleted ids are never reused.
    #[serde(default = "first_task_id")]
    next_task_id: u64,
    /// Snapshot of the schedule taken by [`TaskStore::set_baseline`].
    #[serde(default)]
    pub baseline: Vec<Task>,
    /// User-defined columns, in the order they were added.
    #[serde(default)]
    custom_fields_schema: Vec<CustomField>,
}

impl Default for TaskStore {
    fn default() -> Self {
        TaskStore {
            tasks: Vec::new(),
            next_task_id: first_task_id(),
            baseline: Vec::new(),
            custom_fields_schema: Vec::new(),
        }
    }
}

/// Fields for a task about to be created.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub parent_id: Option<u64>,
    pub percent_complete: i64,
    pub description: Option<String>,
    pub resources: Vec<String>,
    /// Only a top-level task may start with predecessors.
    pub dependencies: BTreeSet<u64>,
    pub custom_fields: BTreeMap<String, String>,
}

impl NewTask {
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        NewTask {
            name: name.into(),
            start_date,
            end_date,
            parent_id: None,
            percent_complete: 0,
            description: None,
            resources: Vec::new(),
            dependencies: BTreeSet::new(),
            custom_fields: BTreeMap::new(),
        }
    }
}

/// Outcome of the scheduling and rollup passes run after a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recalculation {
    pub schedule: ScheduleOutcome,
    pub rollup: RollupReport,
}

/// How far a task has slipped against the baseline, in days (positive = later).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variance {
    pub task_id: u64,
    pub start_slip: i64,
    pub end_slip: i64,
}

fn clamp_percent(p: i64) -> u8 {
    p.clamp(0, 100) as u8
}

fn validated_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PlanError::EmptyName);
    }
    Ok(name.to_string())
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(PlanError::InvalidDateRange { start, end });
    }
    Ok(())
}

impl TaskStore {
    /// Load a store from a JSON file; a missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no task file yet; starting empty");
            return Ok(TaskStore::default());
        }
        let mut buf = String::new();
        File::open(path)?.read_to_string(&mut buf)?;
        let mut store: TaskStore = serde_json::from_str(&buf)?;
        store.repair_counter();
        Ok(store)
    }

    /// Save to a JSON file using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Build a store around an existing task list.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut store = TaskStore {
            tasks,
            ..TaskStore::default()
        };
        store.repair_counter();
        store
    }

    // A hand-edited file may carry a counter behind its highest id.
    fn repair_counter(&mut self) {
        let floor = self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        if self.next_task_id < floor {
            self.next_task_id = floor;
        }
    }

    pub fn next_task_id(&self) -> u64 {
        self.next_task_id
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_task_id;
        self.next_task_id += 1;
        id
    }

    /// Create an index mapping task IDs to their positions in the tasks vector.
    pub fn index(&self) -> HashMap<u64, usize> {
        self.tasks.iter().enumerate().map(|(i, t)| (t.id, i)).collect()
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    fn require(&self, id: u64) -> Result<&Task> {
        self.get(id).ok_or(PlanError::TaskNotFound(id))
    }

    pub fn is_parent(&self, id: u64) -> bool {
        is_parent(&self.tasks, id)
    }

    /// Children of `id`, sorted by id.
    pub fn children(&self, id: u64) -> Vec<u64> {
        build_children_map(&self.tasks).remove(&id).unwrap_or_default()
    }

    pub fn descendants(&self, id: u64) -> HashSet<u64> {
        collect_descendants(id, &build_children_map(&self.tasks))
    }

    /// Run the dependency scheduler and the hierarchy rollup until neither moves anything.
    ///
    /// A rollup can shift a parent's end date, and a parent is a valid
    /// predecessor, so its dependents need another scheduling pass.
    pub fn recalculate(&mut self) -> Recalculation {
        let limit = self.tasks.len() + 2;
        let mut shifted: Vec<u64> = Vec::new();
        let mut total = RollupReport::default();

        for round in 1..=limit {
            let outcome = schedule(&mut self.tasks);
            let report = rollup(&mut self.tasks);
            total.passes += report.passes;
            total.changed.extend(report.changed.iter().copied());
            total.converged = report.converged;

            let moved = match outcome {
                ScheduleOutcome::Applied { shifted: moved } => moved,
                halted @ ScheduleOutcome::Halted(_) => {
                    return Recalculation { schedule: halted, rollup: total };
                }
            };
            let settled = moved.is_empty() && report.changed.is_empty();
            for id in moved {
                if !shifted.contains(&id) {
                    shifted.push(id);
                }
            }
            if settled {
                debug!(rounds = round, "recalculation settled");
                return Recalculation {
                    schedule: ScheduleOutcome::Applied { shifted },
                    rollup: total,
                };
            }
        }

        warn!(rounds = limit, "scheduling and rollup did not settle");
        total.converged = false;
        Recalculation {
            schedule: ScheduleOutcome::Applied { shifted },
            rollup: total,
        }
    }

    /// Reject columns the store does not define and trim the values.
    fn checked_custom_fields(&self, values: BTreeMap<String, String>) -> Result<BTreeMap<String, String>> {
        let mut out = BTreeMap::new();
        for (key, value) in values {
            if !self.custom_fields_schema.iter().any(|f| f.name == key) {
                return Err(PlanError::UnknownField(key));
            }
            out.insert(key, value.trim().to_string());
        }
        Ok(out)
    }

    /// Add a task with automatic status and return its id.
    pub fn add_task(&mut self, new: NewTask) -> Result<u64> {
        let name = validated_name(&new.name)?;
        check_range(new.start_date, new.end_date)?;
        if let Some(pid) = new.parent_id {
            self.require(pid)?;
            if !new.dependencies.is_empty() {
                return Err(PlanError::SubtaskDependencies(self.next_task_id));
            }
        }
        // A brand-new task has no dependents, so existing predecessors cannot close a loop.
        for &dep in &new.dependencies {
            self.require(dep)?;
        }
        let mut custom = self.checked_custom_fields(new.custom_fields)?;
        custom.retain(|_, v| !v.is_empty());

        let id = self.allocate_id();
        let mut task = Task::new(id, name, new.start_date, new.end_date);
        task.parent_id = new.parent_id;
        task.percent_complete = clamp_percent(new.percent_complete);
        task.description = new.description.filter(|d| !d.trim().is_empty());
        task.resources = new.resources;
        task.dependencies = new.dependencies;
        task.custom_fields = custom;
        self.tasks.push(task);
        info!(task = id, "added task");

        self.recalculate();
        Ok(id)
    }

    /// Add one subtask per non-empty line of `text` under `parent_id`.
    ///
    /// Each subtask starts and ends on the parent's current start date.
    pub fn add_subtasks(&mut self, parent_id: u64, text: &str) -> Result<Vec<u64>> {
        let start = self.require(parent_id)?.start_date;
        let names: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if names.is_empty() {
            return Err(PlanError::EmptyName);
        }

        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let id = self.allocate_id();
            let mut task = Task::new(id, name, start, start);
            task.parent_id = Some(parent_id);
            self.tasks.push(task);
            ids.push(id);
        }
        info!(parent = parent_id, count = ids.len(), "added subtasks");

        self.recalculate();
        Ok(ids)
    }

    /// Apply a partial edit after validating every field.
    ///
    /// Nothing is changed when any check fails. A task that becomes a subtask
    /// loses its manual dependencies unless the same edit sets them.
    pub fn update_task(&mut self, id: u64, update: TaskUpdate) -> Result<()> {
        let current = self.require(id)?;
        let parent = self.is_parent(id);

        if parent {
            if update.start_date.is_some_and(|d| d != current.start_date)
                || update.end_date.is_some_and(|d| d != current.end_date)
            {
                return Err(PlanError::DerivedField { task: id, field: "dates" });
            }
            if update
                .percent_complete
                .is_some_and(|p| clamp_percent(p) != current.percent_complete)
            {
                return Err(PlanError::DerivedField { task: id, field: "completion" });
            }
        }

        let name = update.name.as_deref().map(validated_name).transpose()?;
        let start = update.start_date.unwrap_or(current.start_date);
        let end = update.end_date.unwrap_or(current.end_date);
        check_range(start, end)?;

        if let Some(new_parent) = update.parent_id {
            self.check_parent(id, new_parent)?;
        }
        let parent_after = update.parent_id.unwrap_or(current.parent_id);
        let dependencies = match update.dependencies {
            Some(deps) => {
                self.check_dependencies_under(id, parent_after, &deps)?;
                Some(deps)
            }
            None if parent_after.is_some() && !current.dependencies.is_empty() => {
                debug!(task = id, "clearing dependencies of new subtask");
                Some(BTreeSet::new())
            }
            None => None,
        };
        let custom = update
            .custom_fields
            .map(|values| self.checked_custom_fields(values))
            .transpose()?;

        let task = self.get_mut(id).ok_or(PlanError::TaskNotFound(id))?;
        if let Some(n) = name {
            task.name = n;
        }
        if let Some(d) = update.description {
            task.description = if d.trim().is_empty() { None } else { Some(d) };
        }
        task.start_date = start;
        task.end_date = end;
        task.parent_id = parent_after;
        if let Some(p) = update.percent_complete {
            task.percent_complete = clamp_percent(p);
        }
        if let Some(deps) = dependencies {
            task.dependencies = deps;
        }
        if let Some(r) = update.resources {
            task.resources = r;
        }
        if let Some(n) = update.notes {
            task.notes = if n.trim().is_empty() { None } else { Some(n) };
        }
        if let Some(s) = update.status {
            task.status = s;
        }
        for (key, value) in custom.into_iter().flatten() {
            if value.is_empty() {
                task.custom_fields.remove(&key);
            } else {
                task.custom_fields.insert(key, value);
            }
        }
        debug!(task = id, "updated task");

        self.recalculate();
        Ok(())
    }

    /// Validate a proposed dependency set for `id` without committing it.
    pub fn check_dependencies(&self, id: u64, deps: &BTreeSet<u64>) -> Result<()> {
        let parent = self.require(id)?.parent_id;
        self.check_dependencies_under(id, parent, deps)
    }

    // `parent` is where the task will sit once the edit commits.
    fn check_dependencies_under(&self, id: u64, parent: Option<u64>, deps: &BTreeSet<u64>) -> Result<()> {
        if parent.is_some() {
            if deps.is_empty() {
                return Ok(());
            }
            return Err(PlanError::SubtaskDependencies(id));
        }

        let descendants = self.descendants(id);
        for &dep in deps {
            if dep == id {
                return Err(PlanError::SelfDependency(id));
            }
            self.require(dep)?;
            if descendants.contains(&dep) {
                return Err(PlanError::DescendantDependency { task: id, dependency: dep });
            }
            if would_create_cycle(&self.tasks, id, dep) {
                return Err(PlanError::CycleDetected { task: id, dependency: dep });
            }
        }
        Ok(())
    }

    // Re-parenting `id` under `parent` must not make any new ancestor
    // depend on a task inside the moved subtree.
    fn check_parent(&self, id: u64, parent: Option<u64>) -> Result<()> {
        let Some(pid) = parent else { return Ok(()) };
        self.require(pid)?;
        let mut subtree = self.descendants(id);
        if pid == id || subtree.contains(&pid) {
            return Err(PlanError::ParentCycle { task: id, parent: pid });
        }
        subtree.insert(id);

        let mut ancestors = vec![pid];
        ancestors.extend(collect_ancestors(pid, &self.tasks));
        for ancestor in ancestors {
            let task = self.require(ancestor)?;
            if let Some(&dep) = task.dependencies.iter().find(|d| subtree.contains(d)) {
                return Err(PlanError::DescendantDependency { task: ancestor, dependency: dep });
            }
        }
        Ok(())
    }

    /// Move a task under a new parent, or to the top level with `None`.
    ///
    /// A task that becomes a subtask loses its manual dependencies.
    pub fn set_parent(&mut self, id: u64, parent: Option<u64>) -> Result<()> {
        self.update_task(id, TaskUpdate { parent_id: Some(parent), ..TaskUpdate::default() })
    }

    /// Shift a leaf task by `delta_days`, keeping its duration.
    pub fn move_task(&mut self, id: u64, delta_days: i64) -> Result<()> {
        let current = self.require(id)?;
        if self.is_parent(id) {
            return Err(PlanError::DerivedField { task: id, field: "dates" });
        }
        if delta_days == 0 {
            return Ok(());
        }

        let start = try_add_days(current.start_date, delta_days)?;
        let end = try_add_days(current.end_date, delta_days)?;

        let task = self.get_mut(id).ok_or(PlanError::TaskNotFound(id))?;
        task.start_date = start;
        task.end_date = end;
        debug!(task = id, delta_days, "moved task");

        self.recalculate();
        Ok(())
    }

    /// Move one edge of a leaf task by `delta_days`.
    pub fn resize_task(&mut self, id: u64, handle: Handle, delta_days: i64) -> Result<()> {
        let current = self.require(id)?;
        if self.is_parent(id) {
            return Err(PlanError::DerivedField { task: id, field: "dates" });
        }

        let (start, end) = match handle {
            Handle::Start => (try_add_days(current.start_date, delta_days)?, current.end_date),
            Handle::End => (current.start_date, try_add_days(current.end_date, delta_days)?),
        };
        check_range(start, end)?;

        let task = self.get_mut(id).ok_or(PlanError::TaskNotFound(id))?;
        task.start_date = start;
        task.end_date = end;
        debug!(task = id, ?handle, delta_days, "resized task");

        self.recalculate();
        Ok(())
    }

    /// Delete a task and all of its descendants.
    ///
    /// Every removed id is also stripped from the surviving tasks' dependencies.
    /// Returns the removed ids in ascending order.
    pub fn delete_task(&mut self, id: u64) -> Result<Vec<u64>> {
        self.require(id)?;
        let mut removed = self.descendants(id);
        removed.insert(id);

        self.tasks.retain(|t| !removed.contains(&t.id));
        for t in self.tasks.iter_mut() {
            t.dependencies.retain(|d| !removed.contains(d));
        }
        info!(task = id, removed = removed.len(), "deleted task");

        self.recalculate();
        let mut ids: Vec<u64> = removed.into_iter().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    pub fn custom_fields(&self) -> &[CustomField] {
        &self.custom_fields_schema
    }

    /// Define a new text column. Names are unique ignoring case.
    pub fn add_custom_field(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlanError::InvalidFieldName(name.to_string()));
        }
        let lower = name.to_lowercase();
        if self.custom_fields_schema.iter().any(|f| f.name.to_lowercase() == lower) {
            return Err(PlanError::DuplicateField(name.to_string()));
        }
        self.custom_fields_schema.push(CustomField {
            name: name.to_string(),
            field_type: Default::default(),
        });
        info!(field = name, "added custom field");
        Ok(())
    }

    /// Drop a column and every task's value for it.
    pub fn remove_custom_field(&mut self, name: &str) -> Result<()> {
        let pos = self
            .custom_fields_schema
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| PlanError::UnknownField(name.to_string()))?;
        self.custom_fields_schema.remove(pos);
        for t in self.tasks.iter_mut() {
            t.custom_fields.remove(name);
        }
        info!(field = name, "removed custom field");
        Ok(())
    }

    /// Snapshot the current schedule as the baseline, replacing any earlier one.
    pub fn set_baseline(&mut self) {
        self.baseline = self.tasks.clone();
        info!(tasks = self.baseline.len(), "baseline set");
    }

    /// Start and end slip of every task present in both the schedule and the baseline.
    pub fn baseline_variance(&self) -> Vec<Variance> {
        let base: HashMap<u64, &Task> = self.baseline.iter().map(|t| (t.id, t)).collect();
        self.tasks
            .iter()
            .filter_map(|t| {
                let b = base.get(&t.id)?;
                Some(Variance {
                    task_id: t.id,
                    start_slip: difference_in_days(b.start_date, t.start_date),
                    end_slip: difference_in_days(b.end_date, t.end_date),
                })
            })
            .collect()
    }
}
