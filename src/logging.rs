//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `PLAN_LOG` environment variable, either a level ("debug") or a full
//!    filter directive ("plan_schedule::schedule=debug")
//! 3. default to `warn`
//!
//! Logs go to STDERR so stdout stays clean for command output and CSV.

use clap::ValueEnum;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable consulted when no `--log-level` is given.
pub const LOG_ENV: &str = "PLAN_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Pick the filter directive from the CLI flag and the environment value.
fn filter_directive(cli_level: Option<LogLevel>, env_value: Option<&str>) -> String {
    if let Some(lvl) = cli_level {
        return lvl.directive().to_string();
    }
    match env_value.map(str::trim) {
        Some(v) if !v.is_empty() && EnvFilter::try_new(v).is_ok() => v.to_string(),
        _ => DEFAULT_DIRECTIVE.to_string(),
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(cli_level: Option<LogLevel>) {
    let env_value = std::env::var(LOG_ENV).ok();
    let directive = filter_directive(cli_level, env_value.as_deref());

    let installed = fmt()
        .with_env_filter(EnvFilter::new(&directive))
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init();

    if installed.is_ok() {
        tracing::debug!(%directive, "logging initialised");
    }
}
