//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::net::TcpListener;

use crate::api::{self, AppState};
use crate::cli::{Cli, Command};
use crate::config::{self, Config, ServerConfig};
use crate::logging;
use crate::reminders::{run_reminder_scan, spawn_reminder_loop};
use crate::tracker::{self, seed_sample_data, SqliteTrackerStore, TrackerStore};

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

/// Run a parsed command line.
pub fn run(cli: Cli) -> CliOutput {
    let Cli { config, command } = cli;
    match command {
        Command::Version => run_version(),
        Command::EnsureConfig => run_ensure_config(&config),
        Command::Seed => run_seed(&config),
        Command::Remind { days } => run_remind(&config, days),
        Command::Serve { bind, database } => run_serve(&config, bind, database),
    }
}

// === Utility Commands ===

fn run_version() -> CliOutput {
    success_output(format!("project-tracker v{}", crate::VERSION))
}

fn run_ensure_config(path: &Path) -> CliOutput {
    match config::ensure_config_at(path) {
        Ok(config) => {
            let server = &config.server;
            let database = server.database_path();
            CliOutput {
                exit_code: ExitCode::SUCCESS,
                stdout: vec![],
                stderr: vec![
                    format!("Config ensured at {}", path.display()),
                    format!("  bind: {}", server.bind),
                    format!("  database: {}", database.display()),
                    format!(
                        "  per_page: {} (max {})",
                        server.default_per_page, server.max_per_page
                    ),
                    format!("  client base_url: {}", config.client.base_url),
                ],
            }
        }
        Err(e) => error_output(format!("Error ensuring config: {e}")),
    }
}

// === Database Commands ===

fn run_seed(path: &Path) -> CliOutput {
    let (config, store) = match prepare(path) {
        Ok(prepared) => prepared,
        Err(output) => return output,
    };
    match seed_sample_data(&store) {
        Ok(report) => success_output(format!(
            "Seeded {} projects and {} tasks into {}",
            report.projects,
            report.tasks,
            config.server.database_path().display()
        )),
        Err(e) => error_output(format!("Error seeding database: {e}")),
    }
}

fn run_remind(path: &Path, days: Option<u32>) -> CliOutput {
    let config = match load_config(path) {
        Ok(config) => config,
        Err(output) => return output,
    };
    init_logging(&config);
    let max_age_days = days.unwrap_or(config.server.reminder_max_age_days);

    // The scan is read-only; never create a database just to find it empty.
    let database = config.server.database_path();
    let store = match tracker::open_existing(&database) {
        Ok(Some(store)) => store,
        Ok(None) => {
            return success_output(format!(
                "No database at {}; no pending tasks older than {max_age_days} days.",
                database.display()
            ));
        }
        Err(e) => return error_output(format!("Error opening database: {e}")),
    };
    match run_reminder_scan(&store, Utc::now(), max_age_days) {
        Ok(report) => {
            let mut lines: Vec<String> = report
                .reminders
                .iter()
                .map(|r| {
                    format!(
                        "#{} {} ({}, {} days old)",
                        r.task.id, r.task.title, r.project_name, r.days_old
                    )
                })
                .collect();
            lines.push(report.summary());
            CliOutput { exit_code: ExitCode::SUCCESS, stdout: lines, stderr: vec![] }
        }
        Err(e) => error_output(format!("Error scanning for reminders: {e}")),
    }
}

fn run_serve(path: &Path, bind: Option<String>, database: Option<PathBuf>) -> CliOutput {
    let mut config = match load_config(path) {
        Ok(config) => config,
        Err(output) => return output,
    };
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(database) = database {
        config.server.database_path = Some(database);
    }
    init_logging(&config);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => return error_output(format!("Error starting runtime: {e}")),
    };
    match runtime.block_on(serve(config.server)) {
        Ok(()) => CliOutput {
            exit_code: ExitCode::SUCCESS,
            stdout: vec![],
            stderr: vec!["Server stopped".to_string()],
        },
        Err(e) => error_output(format!("Server error: {e}")),
    }
}

async fn serve(server: ServerConfig) -> crate::Result<()> {
    let address = server.bind_addr()?;
    let store: Arc<dyn TrackerStore + Send + Sync> =
        Arc::new(SqliteTrackerStore::new(server.database_path())?);

    let reminders = server.reminder_interval_secs.filter(|secs| *secs > 0).map(|secs| {
        tracing::info!(
            interval_secs = secs,
            max_age_days = server.reminder_max_age_days,
            "Scheduling reminder scans"
        );
        spawn_reminder_loop(
            Arc::clone(&store),
            Duration::from_secs(secs),
            server.reminder_max_age_days,
        )
    });

    let listener = TcpListener::bind(address).await?;
    let result = api::serve(listener, AppState::new(store, server)).await;
    if let Some(handle) = reminders {
        handle.abort();
    }
    result
}

// === Helper Functions ===

fn load_config(path: &Path) -> Result<Config, CliOutput> {
    Config::resolve(path).map_err(|e| error_output(format!("Error loading config: {e}")))
}

/// Load config, install logging, and open the store.
fn prepare(path: &Path) -> Result<(Config, SqliteTrackerStore), CliOutput> {
    let config = load_config(path)?;
    init_logging(&config);
    let store = SqliteTrackerStore::new(config.server.database_path())
        .map_err(|e| error_output(format!("Error opening database: {e}")))?;
    Ok((config, store))
}

fn init_logging(config: &Config) {
    // Only the first command in a process gets to install the subscriber.
    if let Err(error) = logging::init(&config.server.log) {
        tracing::debug!(%error, "logging already initialised");
    }
}

fn success_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![message], stderr: vec![] }
}

fn error_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![message] }
}
