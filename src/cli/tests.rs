//! Tests for the CLI module.

use super::*;
use crate::config::Config;
use crate::tracker::{NewProject, NewTask, SqliteTrackerStore, Status, TrackerStore};
use chrono::{Duration, Utc};
use clap::Parser;
use serial_test::serial;
use std::path::Path;
use std::process::ExitCode;
use tempfile::TempDir;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

/// Write a config pointing at a database inside `dir`.
fn write_config(dir: &Path) -> std::path::PathBuf {
    let mut config = Config::default();
    config.server.database_path = Some(dir.join("tracker.sqlite3"));
    let path = dir.join("project-tracker.yaml");
    config.save_to(&path).unwrap();
    path
}

fn run_with(config: &Path, args: &[&str]) -> CliOutput {
    let mut full = vec!["project-tracker", "--config", config.to_str().unwrap()];
    full.extend_from_slice(args);
    run(parse(&full))
}

#[test]
fn test_parse_commands() {
    assert_eq!(parse(&["project-tracker", "version"]).command, Command::Version);
    assert_eq!(parse(&["project-tracker", "seed"]).command, Command::Seed);
    assert_eq!(parse(&["project-tracker", "ensure-config"]).command, Command::EnsureConfig);
    assert_eq!(
        parse(&["project-tracker", "remind", "--days", "3"]).command,
        Command::Remind { days: Some(3) }
    );
    assert_eq!(
        parse(&["project-tracker", "serve", "--bind", "0.0.0.0:9000"]).command,
        Command::Serve { bind: Some("0.0.0.0:9000".to_string()), database: None }
    );
}

#[test]
fn test_config_flag_defaults_and_is_global() {
    let cli = parse(&["project-tracker", "version"]);
    assert_eq!(cli.config, Path::new("project-tracker.yaml"));
    let cli = parse(&["project-tracker", "seed", "--config", "other.yaml"]);
    assert_eq!(cli.config, Path::new("other.yaml"));
}

#[test]
fn test_parse_rejects_bad_days() {
    assert!(Cli::try_parse_from(["project-tracker", "remind", "--days", "soon"]).is_err());
    assert!(Cli::try_parse_from(["project-tracker", "frobnicate"]).is_err());
    assert!(Cli::try_parse_from(["project-tracker", "remind", "--days", "1000000000"]).is_err());
    assert_eq!(
        parse(&["project-tracker", "remind", "--days", "36500"]).command,
        Command::Remind { days: Some(36_500) }
    );
}

#[test]
fn test_version() {
    let output = run(parse(&["project-tracker", "version"]));
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert_eq!(output.stdout, vec![format!("project-tracker v{}", crate::VERSION)]);
}

#[test]
fn test_ensure_config_creates_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("project-tracker.yaml");
    let output = run_with(&path, &["ensure-config"]);
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert!(path.exists());
    assert!(output.stderr[0].starts_with("Config ensured at"));
}

#[test]
#[serial]
fn test_seed_then_remind() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    let output = run_with(&config, &["seed"]);
    assert_eq!(output.exit_code, ExitCode::SUCCESS, "{:?}", output.stderr);
    assert!(output.stdout[0].starts_with("Seeded 3 projects and 7 tasks"));

    let output = run_with(&config, &["remind"]);
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert_eq!(output.stdout.len(), 2);
    assert!(output.stdout[0].contains("Long-pending task"));
    assert_eq!(output.stdout[1], "Sent reminders for 1 pending tasks older than 7 days.");
}

#[test]
#[serial]
fn test_remind_days_override() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let store = SqliteTrackerStore::new(dir.path().join("tracker.sqlite3")).unwrap();
    let project = store.create_project(&NewProject { name: "P".into() }).unwrap();
    store
        .create_task(&NewTask {
            created_at: Some(Utc::now() - Duration::days(3)),
            ..NewTask::new("Three days", Status::Pending, project.id)
        })
        .unwrap();

    let output = run_with(&config, &["remind"]);
    assert_eq!(output.stdout, vec!["No pending tasks older than 7 days found.".to_string()]);

    let output = run_with(&config, &["remind", "--days", "2"]);
    assert_eq!(
        output.stdout.last().unwrap(),
        "Sent reminders for 1 pending tasks older than 2 days."
    );
}

#[test]
#[serial]
fn test_remind_without_database_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    let output = run_with(&config, &["remind"]);
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert!(output.stdout[0].starts_with("No database at"));
    assert!(!dir.path().join("tracker.sqlite3").exists());
}

#[test]
#[serial]
fn test_remind_reports_unreadable_database() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    std::fs::write(dir.path().join("tracker.sqlite3"), "not a database").unwrap();

    let output = run_with(&config, &["remind"]);
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stderr[0].starts_with("Error opening database"));
}

#[test]
#[serial]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("project-tracker.yaml");
    std::fs::write(&path, "server: [not, a, map]\n").unwrap();

    let output = run_with(&path, &["seed"]);
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stderr[0].starts_with("Error loading config"));
}
