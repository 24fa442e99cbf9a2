use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use plan_schedule::dates::parse_date;
use plan_schedule::logging::LogLevel;

use crate::cmd::Commands;

/// File-backed project schedule with dependency-driven auto-scheduling.
/// Storage defaults to ~/.plan/tasks.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "plan", version, about = "Gantt-style project scheduling CLI")]
pub struct Cli {
    /// Path to the JSON task file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log verbosity (overrides PLAN_LOG).
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Treat this date (YYYY-MM-DD) as today when classifying status.
    #[arg(long, global = true, value_parser = parse_date)]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Commands,
}
