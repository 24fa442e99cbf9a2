//! # plan - Gantt-style project scheduling CLI
//!
//! A command-line front end for the `plan_schedule` engine: tasks with start
//! and end dates, nesting under parent tasks, and finish-to-start
//! dependencies. Every edit re-runs auto-scheduling and the parent rollup
//! before the plan is saved.
//!
//! ## Quick Start
//!
//! ```bash
//! plan add "Site survey" --start 2024-03-01 --end 2024-03-05
//! plan add "Foundations" --start 2024-03-01 --end 2024-03-14 --after "Site survey"
//! plan list --tree
//! plan field add Owner
//! plan update "Foundations" --field Owner=Ana
//! plan report --today 2024-03-10
//! ```
//!
//! Data is stored in `~/.plan/tasks.json` unless `--db` points elsewhere.
//! Logs go to stderr; set `PLAN_LOG=debug` or pass `--log-level` to see
//! scheduling decisions.

use std::path::PathBuf;

use chrono::Local;
use clap::Parser;

use plan_schedule::db::TaskStore;
use plan_schedule::logging::init_logging;

mod cli;
mod cmd;

use cli::Cli;
use cmd::*;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return;
    }

    let db_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".plan").join("tasks.json")
    });

    let mut store = match TaskStore::load(&db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to load {}: {}", db_path.display(), e);
            std::process::exit(1);
        }
    };
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    tracing::debug!(db = %db_path.display(), tasks = store.tasks.len(), %today, "plan loaded");

    match cli.command {
        Commands::Add { name, start, end, parent, after, percent, desc, resources, fields } =>
            cmd_add(&mut store, &db_path, today, name, start, end, parent, after, percent, desc, resources, fields),

        Commands::Subtasks { parent, names } => cmd_subtasks(&mut store, &db_path, parent, names),

        Commands::List { status, name, resource, tree, sort, limit } =>
            cmd_list(&store, today, status, name, resource, tree, sort, limit),

        Commands::View { id, children, parents } => cmd_view(&store, today, id, children, parents),

        Commands::Update {
            id, name, desc, start, end, percent, after, clear_deps, resources, notes,
            status, parent, clear_parent, fields,
        } => cmd_update(&mut store, &db_path, today, id, name, desc, start, end, percent,
                        after, clear_deps, resources, notes, status, parent, clear_parent, fields),

        Commands::Move { id, days } => cmd_move(&mut store, &db_path, id, days),

        Commands::Resize { id, handle, days } => cmd_resize(&mut store, &db_path, id, handle, days),

        Commands::Delete { id } => cmd_delete(&mut store, &db_path, id),

        Commands::Schedule { check } => cmd_schedule(&mut store, &db_path, check),

        Commands::Baseline { action } => cmd_baseline(&mut store, &db_path, action),

        Commands::Field { action } => cmd_field(&mut store, &db_path, action),

        Commands::Notify => cmd_notify(&store, today),

        Commands::Report { days } => cmd_report(&store, today, days),

        Commands::Export { output } => cmd_export(&store, today, output),

        Commands::Completions { .. } => unreachable!("completions handled above"),
    }
}
