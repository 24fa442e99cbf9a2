//! Command implementations for the CLI interface.
//!
//! Each handler resolves its arguments, performs one store operation and
//! prints the result. Errors are reported on stderr and exit with status 1.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt::Display;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Subcommand;
use clap_complete::{generate, Shell};

use plan_schedule::cycle::find_cycle;
use plan_schedule::dates::{format_date, parse_date_input};
use plan_schedule::db::{NewTask, TaskStore};
use plan_schedule::export::to_csv;
use plan_schedule::fields::{Handle, SortKey, Status, StatusSetting};
use plan_schedule::graph::{build_children_map, collect_ancestors, depth_map, DependencyGraph};
use plan_schedule::rollup::overall_progress;
use plan_schedule::schedule::ScheduleOutcome;
use plan_schedule::status::{
    at_risk_and_overdue, effective_status, milestones, notifications, upcoming, DEFAULT_UPCOMING_DAYS,
};
use plan_schedule::task::{Task, TaskUpdate};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Task name.
        name: String,
        /// Start date: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long, default_value = "today")]
        start: String,
        /// End date (defaults to the start date).
        #[arg(long)]
        end: Option<String>,
        /// Parent task ID or name.
        #[arg(long)]
        parent: Option<String>,
        /// Tasks that must finish first (ID or name). May be repeated.
        #[arg(long = "after")]
        after: Vec<String>,
        /// Percent complete (0-100).
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        percent: i64,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Assigned resource. May be repeated.
        #[arg(long = "resource")]
        resources: Vec<String>,
        /// Custom field value as NAME=VALUE. May be repeated.
        #[arg(long = "field", value_parser = parse_field_pair)]
        fields: Vec<(String, String)>,
    },

    /// Add one subtask per name under a parent. Reads names from stdin when none are given.
    Subtasks {
        /// Parent task ID or name.
        parent: String,
        /// Subtask names.
        names: Vec<String>,
    },

    /// List tasks.
    List {
        /// Filter by effective status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Only tasks whose name contains this text (case-insensitive).
        #[arg(long)]
        name: Option<String>,
        /// Only tasks with a resource containing this text (case-insensitive).
        #[arg(long)]
        resource: Option<String>,
        /// Render as a tree across parent-child relationships.
        #[arg(long)]
        tree: bool,
        /// Sort key (ignored with --tree).
        #[arg(long, value_enum, default_value_t = SortKey::Start)]
        sort: SortKey,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// View a single task by ID or name.
    View {
        /// Task ID or name to view
        id: String,
        /// Show the subtask tree.
        #[arg(long)]
        children: bool,
        /// Show the ancestor chain.
        #[arg(long)]
        parents: bool,
    },

    /// Update an existing task.
    Update {
        /// Task ID or name.
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        percent: Option<i64>,
        /// Replace the dependency list. May be repeated.
        #[arg(long = "after", conflicts_with = "clear_deps")]
        after: Vec<String>,
        /// Remove every dependency.
        #[arg(long)]
        clear_deps: bool,
        /// Replace the resource list. May be repeated.
        #[arg(long = "resource")]
        resources: Vec<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Status: auto | on-track | at-risk | delayed | complete.
        #[arg(long)]
        status: Option<StatusSetting>,
        /// New parent task ID or name.
        #[arg(long, conflicts_with = "clear_parent")]
        parent: Option<String>,
        /// Make the task top-level.
        #[arg(long)]
        clear_parent: bool,
        /// Set a custom field as NAME=VALUE; an empty VALUE clears it. May be repeated.
        #[arg(long = "field", value_parser = parse_field_pair)]
        fields: Vec<(String, String)>,
    },

    /// Shift a task by a number of days, keeping its duration.
    Move {
        id: String,
        #[arg(allow_negative_numbers = true)]
        days: i64,
    },

    /// Move the start or end edge of a task.
    Resize {
        id: String,
        #[arg(value_enum)]
        handle: Handle,
        #[arg(allow_negative_numbers = true)]
        days: i64,
    },

    /// Delete a task together with its subtasks.
    Delete {
        id: String,
    },

    /// Re-run auto-scheduling and rollup over the whole plan.
    Schedule {
        /// Only look for dependency cycles; change nothing.
        #[arg(long)]
        check: bool,
    },

    /// Baseline management.
    Baseline {
        #[command(subcommand)]
        action: BaselineAction,
    },

    /// Manage user-defined task columns.
    Field {
        #[command(subcommand)]
        action: FieldAction,
    },

    /// Show overdue and due-soon alerts.
    Notify,

    /// Progress, risk, upcoming deadlines and milestones.
    Report {
        /// Look-ahead window for upcoming deadlines, in days.
        #[arg(long, default_value_t = DEFAULT_UPCOMING_DAYS)]
        days: i64,
    },

    /// Export tasks to CSV.
    Export {
        /// Output file path (default: stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Clone, Copy)]
pub enum BaselineAction {
    /// Snapshot the current schedule.
    Set,
    /// Compare the current schedule against the snapshot.
    Show,
}

#[derive(Subcommand, Clone)]
pub enum FieldAction {
    /// Define a new text column.
    Add { name: String },
    /// Remove a column and every task's value for it.
    Remove { name: String },
    /// List the defined columns.
    List,
}

/// Split a `NAME=VALUE` argument at the first `=`.
fn parse_field_pair(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Whether a task passes the `list` filters. Text filters ignore case.
pub fn matches_filters(
    task: &Task,
    today: NaiveDate,
    status: Option<Status>,
    name: Option<&str>,
    resource: Option<&str>,
) -> bool {
    let name_ok = name.map_or(true, |n| task.name.to_lowercase().contains(&n.to_lowercase()));
    let resource_ok = resource.map_or(true, |r| {
        let r = r.to_lowercase();
        task.resources.iter().any(|have| have.to_lowercase().contains(&r))
    });
    name_ok && resource_ok && status.map_or(true, |s| effective_status(task, today) == s)
}

fn fail(context: &str, err: impl Display) -> ! {
    eprintln!("{context}: {err}");
    std::process::exit(1);
}

fn save_or_exit(store: &TaskStore, db_path: &Path) {
    if let Err(e) = store.save(db_path) {
        fail("Failed to save DB", e);
    }
}

/// Resolve a task identifier (either ID or name) to a task ID.
/// Returns an error if the name has multiple matches and suggests using ID instead.
pub fn resolve_task_identifier(identifier: &str, store: &TaskStore) -> Result<u64, String> {
    if let Ok(id) = identifier.trim().parse::<u64>() {
        return match store.get(id) {
            Some(_) => Ok(id),
            None => Err(format!("Task with ID {id} not found")),
        };
    }

    let wanted = identifier.trim().to_lowercase();
    let matches: Vec<&Task> = store.tasks.iter().filter(|t| t.name.to_lowercase() == wanted).collect();

    match matches.as_slice() {
        [] => Err(format!("No task found with name '{identifier}'")),
        [only] => Ok(only.id),
        many => {
            let mut msg = format!("Multiple tasks found with name '{identifier}':\n");
            for t in many {
                msg.push_str(&format!("  ID {}: {} ({} - {})\n", t.id, t.name, t.start_date, t.end_date));
            }
            msg.push_str("Please use the specific ID instead.");
            Err(msg)
        }
    }
}

fn resolve_or_exit(identifier: &str, store: &TaskStore) -> u64 {
    resolve_task_identifier(identifier, store).unwrap_or_else(|e| fail("Error resolving task", e))
}

fn date_or_exit(input: &str, today: NaiveDate) -> NaiveDate {
    parse_date_input(input, today).unwrap_or_else(|e| fail("Error", e))
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Print tasks in a formatted table with optional tree indentation.
pub fn print_table(tasks: &[&Task], today: NaiveDate, id_to_depth: Option<&HashMap<u64, usize>>) {
    println!(
        "{:<5} {:<10} {:<10} {:>5} {:>4} {:<9} {}",
        "ID", "Start", "End", "Days", "%", "Status", "Name"
    );
    for t in tasks {
        let indent = id_to_depth.and_then(|m| m.get(&t.id).copied()).unwrap_or(0);
        let deps = if t.dependencies.is_empty() {
            String::new()
        } else {
            let ids: Vec<String> = t.dependencies.iter().map(|d| format!("#{d}")).collect();
            format!(" (after {})", ids.join(","))
        };
        println!(
            "{:<5} {:<10} {:<10} {:>5} {:>4} {:<9} {}{}{}",
            t.id,
            format_date(t.start_date),
            format_date(t.end_date),
            t.duration_days(),
            t.percent_complete,
            effective_status(t, today).label(),
            "  ".repeat(indent),
            truncate(&t.name, 48),
            deps
        );
    }
}

fn report_schedule_outcome(outcome: &ScheduleOutcome) {
    match outcome {
        ScheduleOutcome::Applied { shifted } if !shifted.is_empty() => {
            let ids: Vec<String> = shifted.iter().map(|i| i.to_string()).collect();
            println!("Rescheduled: {}", ids.join(", "));
        }
        ScheduleOutcome::Applied { .. } => {}
        ScheduleOutcome::Halted(report) => {
            eprintln!("Auto-scheduling halted, circular dependency: {report}");
        }
    }
}

/// Add a new task, optionally nested and with predecessors.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    store: &mut TaskStore,
    db_path: &Path,
    today: NaiveDate,
    name: String,
    start: String,
    end: Option<String>,
    parent: Option<String>,
    after: Vec<String>,
    percent: i64,
    desc: Option<String>,
    resources: Vec<String>,
    fields: Vec<(String, String)>,
) {
    let start_date = date_or_exit(&start, today);
    let end_date = end.map(|e| date_or_exit(&e, today)).unwrap_or(start_date);
    let parent_id = parent.map(|p| resolve_or_exit(&p, store));
    let deps: BTreeSet<u64> = after.iter().map(|a| resolve_or_exit(a, store)).collect();

    let mut new = NewTask::new(name, start_date, end_date);
    new.parent_id = parent_id;
    new.percent_complete = percent;
    new.description = desc;
    new.resources = resources;
    new.dependencies = deps;
    new.custom_fields = fields.into_iter().collect();

    let id = store.add_task(new).unwrap_or_else(|e| fail("Error", e));
    save_or_exit(store, db_path);
    println!("Added task {id}");
}

/// Add several subtasks at once.
pub fn cmd_subtasks(store: &mut TaskStore, db_path: &Path, parent: String, names: Vec<String>) {
    let parent_id = resolve_or_exit(&parent, store);
    let text = if names.is_empty() {
        let mut buf = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
            fail("Failed to read stdin", e);
        }
        buf
    } else {
        names.join("\n")
    };

    let ids = store.add_subtasks(parent_id, &text).unwrap_or_else(|e| fail("Error", e));
    save_or_exit(store, db_path);
    let ids: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
    println!("Added subtasks {} under {}", ids.join(", "), parent_id);
}

/// List tasks with optional filtering and sorting.
#[allow(clippy::too_many_arguments)]
pub fn cmd_list(
    store: &TaskStore,
    today: NaiveDate,
    status: Option<Status>,
    name: Option<String>,
    resource: Option<String>,
    tree: bool,
    sort: SortKey,
    limit: Option<usize>,
) {
    let keep = |t: &Task| matches_filters(t, today, status, name.as_deref(), resource.as_deref());

    if tree {
        // Depth-first over the parent forest so children follow their parent.
        let child_map = build_children_map(&store.tasks);
        let index = store.index();
        let ids: HashSet<u64> = store.tasks.iter().map(|t| t.id).collect();
        let mut roots: Vec<&Task> = store
            .tasks
            .iter()
            .filter(|t| t.parent_id.map_or(true, |p| !ids.contains(&p)))
            .collect();
        roots.sort_by_key(|t| (t.start_date, t.id));

        let mut ordered: Vec<&Task> = Vec::with_capacity(store.tasks.len());
        let mut seen = HashSet::new();
        let mut stack: Vec<u64> = roots.iter().rev().map(|t| t.id).collect();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(&i) = index.get(&id) else { continue };
            ordered.push(&store.tasks[i]);
            if let Some(children) = child_map.get(&id) {
                let mut kids: Vec<&Task> = children.iter().filter_map(|c| index.get(c)).map(|&j| &store.tasks[j]).collect();
                kids.sort_by_key(|t| (t.start_date, t.id));
                stack.extend(kids.iter().rev().map(|t| t.id));
            }
        }

        let mut filtered: Vec<&Task> = ordered.into_iter().filter(|t| keep(t)).collect();
        if let Some(n) = limit {
            filtered.truncate(n);
        }
        print_table(&filtered, today, Some(&depth_map(&store.tasks)));
        return;
    }

    let mut filtered: Vec<&Task> = store.tasks.iter().filter(|t| keep(t)).collect();
    match sort {
        SortKey::Start => filtered.sort_by_key(|t| (t.start_date, t.id)),
        SortKey::End => filtered.sort_by_key(|t| (t.end_date, t.id)),
        SortKey::Id => filtered.sort_by_key(|t| t.id),
        SortKey::Name => filtered.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()).then(a.id.cmp(&b.id))),
    }
    if let Some(n) = limit {
        filtered.truncate(n);
    }
    print_table(&filtered, today, None);
}

fn id_list(ids: impl IntoIterator<Item = u64>) -> String {
    let ids: Vec<String> = ids.into_iter().map(|i| i.to_string()).collect();
    if ids.is_empty() {
        "-".into()
    } else {
        ids.join(", ")
    }
}

/// View detailed information about a specific task.
pub fn cmd_view(store: &TaskStore, today: NaiveDate, id: String, children: bool, parents: bool) {
    let task_id = resolve_or_exit(&id, store);
    let Some(task) = store.get(task_id) else {
        fail("Error", format!("Task {task_id} not found."));
    };

    let status = match task.status {
        StatusSetting::Auto => format!("{} (auto)", effective_status(task, today)),
        StatusSetting::Explicit(s) => format!("{s} (set manually)"),
    };
    let graph = DependencyGraph::build(&store.tasks);

    println!("ID:           {}", task.id);
    println!("Name:         {}", task.name);
    println!("Start:        {}", format_date(task.start_date));
    println!("End:          {}", format_date(task.end_date));
    println!("Duration:     {} day(s)", task.duration_days());
    println!("Complete:     {}%", task.percent_complete);
    println!("Status:       {status}");
    println!("Parent:       {}", task.parent_id.map(|p| p.to_string()).unwrap_or_else(|| "-".into()));
    println!("After:        {}", id_list(task.dependencies.iter().copied()));
    println!("Blocks:       {}", id_list(graph.dependents_of(task.id).iter().copied()));
    println!("Resources:    {}", if task.resources.is_empty() { "-".into() } else { task.resources.join(", ") });
    println!("Notes:        {}", task.notes.as_deref().unwrap_or("-"));
    for field in store.custom_fields() {
        let value = task.custom_fields.get(&field.name).map(String::as_str).unwrap_or("-");
        println!("{:<13} {}", format!("{}:", field.name), value);
    }
    println!("Description:\n{}\n", task.description.as_deref().unwrap_or("-"));

    if parents {
        let chain = collect_ancestors(task_id, &store.tasks);
        if chain.is_empty() {
            println!("Ancestors: -");
        } else {
            let chain: Vec<String> = chain.iter().map(|i| i.to_string()).collect();
            println!("Ancestors (closest first): {}", chain.join(" -> "));
        }
    }

    if children {
        println!("Children:");
        let child_map = build_children_map(&store.tasks);
        if !child_map.contains_key(&task_id) {
            println!("  -");
            return;
        }
        let mut seen = HashSet::from([task_id]);
        let mut stack: Vec<(u64, usize)> = child_map[&task_id].iter().rev().map(|&c| (c, 1)).collect();
        while let Some((id, depth)) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(t) = store.get(id) {
                println!(
                    "{}- {} [{}] {}% (#{})",
                    "  ".repeat(depth),
                    t.name,
                    effective_status(t, today),
                    t.percent_complete,
                    t.id
                );
            }
            if let Some(kids) = child_map.get(&id) {
                stack.extend(kids.iter().rev().map(|&c| (c, depth + 1)));
            }
        }
    }
}

/// Update an existing task's fields.
#[allow(clippy::too_many_arguments)]
pub fn cmd_update(
    store: &mut TaskStore,
    db_path: &Path,
    today: NaiveDate,
    id: String,
    name: Option<String>,
    desc: Option<String>,
    start: Option<String>,
    end: Option<String>,
    percent: Option<i64>,
    after: Vec<String>,
    clear_deps: bool,
    resources: Vec<String>,
    notes: Option<String>,
    status: Option<StatusSetting>,
    parent: Option<String>,
    clear_parent: bool,
    fields: Vec<(String, String)>,
) {
    let task_id = resolve_or_exit(&id, store);

    let parent_id = match (parent, clear_parent) {
        (Some(p), _) => Some(Some(resolve_or_exit(&p, store))),
        (None, true) => Some(None),
        (None, false) => None,
    };

    let dependencies = if clear_deps {
        Some(BTreeSet::new())
    } else if !after.is_empty() {
        Some(after.iter().map(|a| resolve_or_exit(a, store)).collect())
    } else {
        None
    };

    let update = TaskUpdate {
        parent_id,
        name,
        description: desc,
        start_date: start.map(|s| date_or_exit(&s, today)),
        end_date: end.map(|e| date_or_exit(&e, today)),
        percent_complete: percent,
        dependencies,
        resources: (!resources.is_empty()).then_some(resources),
        notes,
        status,
        custom_fields: (!fields.is_empty()).then(|| fields.into_iter().collect::<BTreeMap<_, _>>()),
    };
    let moved = update.touches_dates();

    store.update_task(task_id, update).unwrap_or_else(|e| fail("Error", e));

    save_or_exit(store, db_path);
    match store.get(task_id) {
        Some(t) if moved => println!("Updated task {task_id} ({} - {})", t.start_date, t.end_date),
        _ => println!("Updated task {task_id}"),
    }
}

/// Shift a task in time.
pub fn cmd_move(store: &mut TaskStore, db_path: &Path, id: String, days: i64) {
    let task_id = resolve_or_exit(&id, store);
    store.move_task(task_id, days).unwrap_or_else(|e| fail("Error", e));
    save_or_exit(store, db_path);
    if let Some(t) = store.get(task_id) {
        println!("Task {task_id} now runs {} - {}", t.start_date, t.end_date);
    }
}

/// Resize a task from one edge.
pub fn cmd_resize(store: &mut TaskStore, db_path: &Path, id: String, handle: Handle, days: i64) {
    let task_id = resolve_or_exit(&id, store);
    store.resize_task(task_id, handle, days).unwrap_or_else(|e| fail("Error", e));
    save_or_exit(store, db_path);
    if let Some(t) = store.get(task_id) {
        println!("Task {task_id} now runs {} - {}", t.start_date, t.end_date);
    }
}

/// Delete a task and all of its subtasks.
pub fn cmd_delete(store: &mut TaskStore, db_path: &Path, id: String) {
    let task_id = resolve_or_exit(&id, store);
    let removed = store.delete_task(task_id).unwrap_or_else(|e| fail("Error", e));
    save_or_exit(store, db_path);
    if removed.len() > 1 {
        println!("Deleted {} task(s): {}", removed.len(), id_list(removed));
    } else {
        println!("Deleted.");
    }
}

/// Recalculate the whole plan, or just check it for cycles.
pub fn cmd_schedule(store: &mut TaskStore, db_path: &Path, check: bool) {
    if check {
        match find_cycle(&store.tasks) {
            Some(report) => fail("Circular dependency", report),
            None => println!("No dependency cycles."),
        }
        return;
    }

    let recalc = store.recalculate();
    save_or_exit(store, db_path);
    report_schedule_outcome(&recalc.schedule);
    if !recalc.rollup.changed.is_empty() {
        println!("Rolled up: {}", id_list(recalc.rollup.changed.iter().copied()));
    }
    if recalc.schedule.is_halted() {
        std::process::exit(1);
    }
    println!("Schedule is up to date.");
}

/// Set or compare against the baseline.
pub fn cmd_baseline(store: &mut TaskStore, db_path: &Path, action: BaselineAction) {
    match action {
        BaselineAction::Set => {
            store.set_baseline();
            save_or_exit(store, db_path);
            println!("Baseline set for {} task(s).", store.baseline.len());
        }
        BaselineAction::Show => {
            if store.baseline.is_empty() {
                println!("No baseline set.");
                return;
            }
            println!("{:<5} {:>10} {:>10} {}", "ID", "Start slip", "End slip", "Name");
            for v in store.baseline_variance() {
                let name = store.get(v.task_id).map(|t| t.name.as_str()).unwrap_or("-");
                println!("{:<5} {:>+10} {:>+10} {}", v.task_id, v.start_slip, v.end_slip, truncate(name, 48));
            }
        }
    }
}

/// Add, remove or list custom fields.
pub fn cmd_field(store: &mut TaskStore, db_path: &Path, action: FieldAction) {
    match action {
        FieldAction::Add { name } => {
            store.add_custom_field(&name).unwrap_or_else(|e| fail("Error", e));
            save_or_exit(store, db_path);
            println!("Added field '{}'", name.trim());
        }
        FieldAction::Remove { name } => {
            store.remove_custom_field(&name).unwrap_or_else(|e| fail("Error", e));
            save_or_exit(store, db_path);
            println!("Removed field '{name}'");
        }
        FieldAction::List => {
            if store.custom_fields().is_empty() {
                println!("No custom fields.");
            }
            for field in store.custom_fields() {
                let used = store.tasks.iter().filter(|t| t.custom_fields.contains_key(&field.name)).count();
                println!("{:<24} text  ({used} task(s) set)", field.name);
            }
        }
    }
}

/// Print deadline alerts.
pub fn cmd_notify(store: &TaskStore, today: NaiveDate) {
    let notes = notifications(&store.tasks, today);
    if notes.is_empty() {
        println!("No alerts.");
    }
    for n in notes {
        println!("#{:<4} {}", n.task_id, n.message);
    }
}

fn print_section(title: &str, tasks: &[&Task], today: NaiveDate) {
    println!("\n{title} ({})", tasks.len());
    if tasks.is_empty() {
        println!("  -");
        return;
    }
    print_table(tasks, today, None);
}

/// Print the project report.
pub fn cmd_report(store: &TaskStore, today: NaiveDate, days: i64) {
    println!("Report for {}", format_date(today));
    println!("Overall progress: {}%", overall_progress(&store.tasks));
    println!("Tasks: {}", store.tasks.len());

    print_section("At risk / overdue", &at_risk_and_overdue(&store.tasks, today), today);
    print_section(&format!("Due in the next {days} day(s)"), &upcoming(&store.tasks, today, days), today);
    print_section("Milestones", &milestones(&store.tasks), today);
}

/// Export tasks to CSV.
pub fn cmd_export(store: &TaskStore, today: NaiveDate, output: Option<PathBuf>) {
    let csv = to_csv(&store.tasks, store.custom_fields(), today);
    match output {
        None => print!("{csv}"),
        Some(path) => {
            if let Err(e) = std::fs::write(&path, csv) {
                fail("Failed to write CSV file", e);
            }
            println!("Exported {} task(s) to {}", store.tasks.len(), path.display());
        }
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
