//! Projects, tasks, and the store that keeps them.
//!
//! This module provides:
//! - Projects owning zero or more tasks, deleted together
//! - Tasks with a `pending`/`completed` status
//! - Paginated listing with AND-composed filters and substring search
//!
//! # Example
//!
//! ```no_run
//! use project_tracker::tracker::{
//!     NewProject, NewTask, SqliteTrackerStore, Status, TaskFilter, TaskQuery, TrackerStore,
//! };
//!
//! let store = SqliteTrackerStore::new("/tmp/tracker.db").unwrap();
//!
//! let project = store.create_project(&NewProject { name: "Website".into() }).unwrap();
//! store.create_task(&NewTask::new("Homepage", Status::Pending, project.id)).unwrap();
//!
//! let query = TaskQuery {
//!     filter: TaskFilter { search: Some("home".into()), ..Default::default() },
//!     ..Default::default()
//! };
//! let page = store.list_tasks(&query).unwrap();
//! assert_eq!(page.total, 1);
//! ```

pub mod models;
pub mod query;
pub mod seed;
pub mod store;

pub use models::{
    InvalidStatus, NewProject, NewTask, Project, ProjectSummary, ProjectUpdate, Status, Task,
    TaskUpdate,
};
pub use query::{
    ListParams, Page, PageLimits, PageRequest, ProjectQuery, TaskFilter, TaskQuery,
};
pub use seed::{seed_sample_data, SeedReport};
pub use store::{SqliteTrackerStore, TrackerStore};

use crate::error::Result;
use std::path::Path;

/// Open the store at `path` if the file already exists, leaving it
/// unmodified.
///
/// Returns `Ok(None)` if there is no file at `path`.
///
/// # Errors
///
/// Returns an error if the file exists but is not a tracker database.
pub fn open_existing(path: &Path) -> Result<Option<SqliteTrackerStore>> {
    if !path.exists() {
        return Ok(None);
    }
    SqliteTrackerStore::open_existing(path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_existing_no_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.db");
        assert!(open_existing(&path).unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_open_existing_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tracker.db");
        SqliteTrackerStore::new(&path).unwrap();
        assert!(open_existing(&path).unwrap().is_some());
    }

    #[test]
    fn test_open_existing_corrupted_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tracker.db");
        std::fs::write(&path, "this is not a valid sqlite database").unwrap();
        assert!(open_existing(&path).is_err());
    }

    #[test]
    fn test_open_existing_leaves_foreign_database_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.db");
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE notes (body TEXT);").unwrap();
        drop(conn);

        let err = open_existing(&path).unwrap_err();
        assert!(err.to_string().contains("not a project tracker database"));

        let conn = rusqlite::Connection::open(&path).unwrap();
        let tables: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(tables, 1);
    }
}
