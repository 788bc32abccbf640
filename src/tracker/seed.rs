//! Sample data for a fresh database.

use crate::error::Result;
use crate::tracker::models::{NewProject, NewTask, Status};
use crate::tracker::store::TrackerStore;
use chrono::{Duration, Utc};

/// What the seeder created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// Projects inserted.
    pub projects: usize,
    /// Tasks inserted.
    pub tasks: usize,
}

/// Insert three sample projects and their tasks.
///
/// One pending task is back-dated ten days so the reminder scan has
/// something to report.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub fn seed_sample_data(store: &dyn TrackerStore) -> Result<SeedReport> {
    let shop = store.create_project(&NewProject { name: "E-commerce Website".to_string() })?;
    let mobile = store.create_project(&NewProject { name: "Mobile Application".to_string() })?;
    let docs = store.create_project(&NewProject { name: "REST API Documentation".to_string() })?;

    let tasks = [
        NewTask::new("Build the homepage", Status::Pending, shop.id),
        NewTask::new("Integrate the payment system", Status::Pending, shop.id),
        NewTask::new("User testing", Status::Completed, shop.id),
        NewTask {
            created_at: Some(Utc::now() - Duration::days(10)),
            ..NewTask::new("Long-pending task", Status::Pending, shop.id)
        },
        NewTask::new("Interface design", Status::Completed, mobile.id),
        NewTask::new("Feature development", Status::Pending, mobile.id),
        NewTask::new("Write the documentation", Status::Pending, docs.id),
    ];
    for task in &tasks {
        store.create_task(task)?;
    }

    let report = SeedReport { projects: 3, tasks: tasks.len() };
    tracing::info!(projects = report.projects, tasks = report.tasks, "sample data seeded");
    Ok(report)
}
