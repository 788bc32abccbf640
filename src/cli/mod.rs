//! Command-line interface for the project tracker.
//!
//! `serve` runs the HTTP API; the other commands work directly on the
//! configured database and exit.

mod run;

#[cfg(test)]
mod tests;

pub use run::{run, CliOutput};

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::CONFIG_FILE_NAME;
use crate::reminders::MAX_REMINDER_AGE_DAYS;

/// Project and task tracker.
#[derive(Parser, Debug)]
#[command(name = "project-tracker")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file. Missing files mean defaults.
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Serve the JSON API until interrupted.
    ///
    /// If `reminder_interval_secs` is configured, the stale-task reminder
    /// scan also runs periodically in the background.
    Serve {
        /// Address to listen on, overriding the configuration.
        #[arg(long)]
        bind: Option<String>,

        /// Database file, overriding the configuration.
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Log a reminder for every pending task older than the threshold.
    Remind {
        /// Age threshold in days (default from configuration, normally 7).
        #[arg(
            long,
            value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_REMINDER_AGE_DAYS))
        )]
        days: Option<u32>,
    },

    /// Insert sample projects and tasks.
    Seed,

    /// Ensure config file exists (create with defaults if not).
    #[command(name = "ensure-config")]
    EnsureConfig,

    /// Show version information.
    Version,
}
