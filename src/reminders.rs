//! Reminders for tasks left pending too long.
//!
//! The scan is read-only: it finds pending tasks created before a cutoff and
//! logs one reminder record per task. Nothing is delivered anywhere else.

use crate::error::{Error, Result};
use crate::tracker::{Status, Task, TaskFilter, TrackerStore};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// A task that has been pending longer than the threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    /// The stale task.
    pub task: Task,
    /// Name of the owning project.
    pub project_name: String,
    /// Whole days since the task was created.
    pub days_old: i64,
}

/// Outcome of one reminder scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderReport {
    /// Tasks created before this instant qualified.
    pub cutoff: DateTime<Utc>,
    /// Threshold used for the scan.
    pub max_age_days: u32,
    /// One entry per stale task, in id order.
    pub reminders: Vec<Reminder>,
}

impl ReminderReport {
    /// Number of reminders issued.
    #[must_use]
    pub fn count(&self) -> usize {
        self.reminders.len()
    }

    /// One-line human summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let days = self.max_age_days;
        match self.count() {
            0 => format!("No pending tasks older than {days} days found."),
            n => format!("Sent reminders for {n} pending tasks older than {days} days."),
        }
    }
}

/// Largest accepted age threshold, roughly a century.
pub const MAX_REMINDER_AGE_DAYS: u32 = 36_500;

/// The instant `max_age_days` before `now`.
///
/// # Errors
///
/// Returns [`Error::Config`] if the cutoff falls outside the representable
/// date range.
pub fn reminder_cutoff(now: DateTime<Utc>, max_age_days: u32) -> Result<DateTime<Utc>> {
    Duration::try_days(i64::from(max_age_days))
        .and_then(|age| now.checked_sub_signed(age))
        .ok_or_else(|| {
            Error::Config(format!("reminder age of {max_age_days} days is out of range"))
        })
}

/// Find pending tasks older than `max_age_days` as of `now` and log a
/// reminder for each.
///
/// # Errors
///
/// Returns an error if the cutoff is out of range or the store cannot be read.
pub fn run_reminder_scan(
    store: &dyn TrackerStore,
    now: DateTime<Utc>,
    max_age_days: u32,
) -> Result<ReminderReport> {
    let cutoff = reminder_cutoff(now, max_age_days)?;
    let filter = TaskFilter {
        status: Some(Status::Pending),
        created_before: Some(cutoff),
        ..Default::default()
    };
    let tasks = store.find_tasks(&filter)?;

    let mut project_names: BTreeMap<i64, String> = BTreeMap::new();
    let mut reminders = Vec::with_capacity(tasks.len());
    for task in tasks {
        if !project_names.contains_key(&task.project_id) {
            let name = store.get_project(task.project_id)?.map(|p| p.name).unwrap_or_default();
            project_names.insert(task.project_id, name);
        }
        let project_name = project_names.get(&task.project_id).cloned().unwrap_or_default();
        let days_old = (now - task.created_at).num_days();

        tracing::info!(
            task_id = task.id,
            task_title = %task.title,
            project_name = %project_name,
            days_old,
            created_at = %task.created_at.format("%Y-%m-%d %H:%M:%S"),
            "Task reminder sent"
        );
        reminders.push(Reminder { task, project_name, days_old });
    }

    let report = ReminderReport { cutoff, max_age_days, reminders };
    tracing::info!(count = report.count(), max_age_days, "{}", report.summary());
    Ok(report)
}

/// Run the scan every `interval` on the blocking pool until the runtime
/// shuts down. The first scan runs immediately.
#[cfg(feature = "server")]
pub fn spawn_reminder_loop(
    store: std::sync::Arc<dyn TrackerStore + Send + Sync>,
    interval: std::time::Duration,
    max_age_days: u32,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let store = std::sync::Arc::clone(&store);
            let scan = tokio::task::spawn_blocking(move || {
                run_reminder_scan(store.as_ref(), Utc::now(), max_age_days)
            });
            match scan.await {
                Ok(Ok(_)) => {}
                Ok(Err(error)) => tracing::warn!(%error, "reminder scan failed"),
                Err(error) => tracing::warn!(%error, "reminder scan task panicked"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{NewProject, NewTask, SqliteTrackerStore};
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, SqliteTrackerStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteTrackerStore::new(dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn aged_task(
        store: &SqliteTrackerStore,
        title: &str,
        status: Status,
        project_id: i64,
        created_at: DateTime<Utc>,
    ) -> Task {
        store
            .create_task(&NewTask {
                created_at: Some(created_at),
                ..NewTask::new(title, status, project_id)
            })
            .unwrap()
    }

    #[test]
    fn test_scan_reports_only_old_pending_tasks() {
        let (_dir, store) = create_test_store();
        let now = Utc::now();
        let p = store.create_project(&NewProject { name: "Website".into() }).unwrap();

        let stale = aged_task(&store, "Old pending", Status::Pending, p.id, now - Duration::days(10));
        aged_task(&store, "Old completed", Status::Completed, p.id, now - Duration::days(10));
        aged_task(&store, "Fresh pending", Status::Pending, p.id, now - Duration::days(2));

        let report = run_reminder_scan(&store, now, 7).unwrap();
        assert_eq!(report.count(), 1);
        let reminder = &report.reminders[0];
        assert_eq!(reminder.task, stale);
        assert_eq!(reminder.project_name, "Website");
        assert_eq!(reminder.days_old, 10);
        assert_eq!(report.summary(), "Sent reminders for 1 pending tasks older than 7 days.");
    }

    #[test]
    fn test_scan_with_nothing_stale() {
        let (_dir, store) = create_test_store();
        let report = run_reminder_scan(&store, Utc::now(), 7).unwrap();
        assert_eq!(report.count(), 0);
        assert_eq!(report.summary(), "No pending tasks older than 7 days found.");
    }

    #[test]
    fn test_threshold_is_configurable() {
        let (_dir, store) = create_test_store();
        let now = Utc::now();
        let p = store.create_project(&NewProject { name: "P".into() }).unwrap();
        aged_task(&store, "Three days", Status::Pending, p.id, now - Duration::days(3));

        assert_eq!(run_reminder_scan(&store, now, 7).unwrap().count(), 0);
        assert_eq!(run_reminder_scan(&store, now, 2).unwrap().count(), 1);
    }

    #[test]
    fn test_out_of_range_threshold_is_an_error() {
        let (_dir, store) = create_test_store();
        let result = run_reminder_scan(&store, Utc::now(), 1_000_000_000);
        assert!(matches!(result, Err(Error::Config(_))));

        let now = Utc::now();
        let cutoff = reminder_cutoff(now, MAX_REMINDER_AGE_DAYS).unwrap();
        assert_eq!((now - cutoff).num_days(), i64::from(MAX_REMINDER_AGE_DAYS));
    }

    #[test]
    fn test_scan_does_not_modify_tasks() {
        let (_dir, store) = create_test_store();
        let now = Utc::now();
        let p = store.create_project(&NewProject { name: "P".into() }).unwrap();
        let task = aged_task(&store, "Old", Status::Pending, p.id, now - Duration::days(30));

        run_reminder_scan(&store, now, 7).unwrap();
        assert_eq!(store.get_task(task.id).unwrap().unwrap(), task);
    }

    #[cfg(feature = "server")]
    #[tokio::test(start_paused = true)]
    async fn test_reminder_loop_runs_and_can_be_aborted() {
        let (_dir, store) = create_test_store();
        let handle = spawn_reminder_loop(
            std::sync::Arc::new(store),
            std::time::Duration::from_secs(60),
            7,
        );
        tokio::time::sleep(std::time::Duration::from_secs(130)).await;
        assert!(!handle.is_finished());
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
    }
}
