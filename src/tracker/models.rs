//! Project and task model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Not done yet.
    #[default]
    Pending,
    /// Done.
    Completed,
}

impl Status {
    /// Every accepted status, in display order.
    pub const ALL: [Self; 2] = [Self::Pending, Self::Completed];

    /// Parse a status from its wire name.
    ///
    /// Matching is exact: the stored enum values are lowercase.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid status.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidStatus> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }

    /// Get the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid status string is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl std::fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid status: '{}' (must be one of: pending, completed)", self.0)
    }
}

impl std::error::Error for InvalidStatus {}

/// A project: a named bucket of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Server-assigned identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
    /// When the project was last modified.
    pub updated_at: DateTime<Utc>,
}

/// A task belonging to exactly one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned identifier.
    pub id: i64,
    /// Short title.
    pub title: String,
    /// Current status.
    pub status: Status,
    /// Owning project.
    pub project_id: i64,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last modified.
    pub updated_at: DateTime<Utc>,
}

/// A project together with the number of tasks it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    /// The project row.
    pub project: Project,
    /// Number of tasks currently referencing the project.
    pub tasks_count: u64,
}

/// Validated input for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    /// Project name.
    pub name: String,
}

/// Validated input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Task title.
    pub title: String,
    /// Initial status.
    pub status: Status,
    /// Owning project; must exist.
    pub project_id: i64,
    /// Explicit creation time. `None` means "now"; the seeder back-dates tasks.
    pub created_at: Option<DateTime<Utc>>,
}

impl NewTask {
    /// A task created now.
    #[must_use]
    pub fn new(title: impl Into<String>, status: Status, project_id: i64) -> Self {
        Self { title: title.into(), status, project_id, created_at: None }
    }
}

/// Fields that can be updated on a project.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProjectUpdate {
    /// New name (if Some).
    pub name: Option<String>,
}

impl ProjectUpdate {
    /// Check if any fields are set for update.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

/// Fields that can be updated on a task.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    /// New title (if Some).
    pub title: Option<String>,
    /// New status (if Some).
    pub status: Option<Status>,
    /// New owning project (if Some).
    pub project_id: Option<i64>,
}

impl TaskUpdate {
    /// Check if any fields are set for update.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.status.is_none() && self.project_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_str() {
        assert_eq!(Status::from_str("pending"), Ok(Status::Pending));
        assert_eq!(Status::from_str("completed"), Ok(Status::Completed));
        assert!(Status::from_str("in_progress").is_err());
        assert!(Status::from_str("invalid_status").is_err());
        assert!(Status::from_str("Pending").is_err());
    }

    #[test]
    fn test_status_round_trips_through_as_str() {
        for status in Status::ALL {
            assert_eq!(Status::from_str(status.as_str()), Ok(status));
            assert_eq!(status.to_string(), status.as_str());
        }
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&Status::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        let status: Status = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, Status::Pending);
        assert!(serde_json::from_str::<Status>("\"in_progress\"").is_err());
    }

    #[test]
    fn test_invalid_status_display() {
        let err = InvalidStatus("bogus".to_string());
        assert_eq!(err.to_string(), "invalid status: 'bogus' (must be one of: pending, completed)");
    }

    #[test]
    fn test_update_is_empty() {
        assert!(ProjectUpdate::default().is_empty());
        assert!(!ProjectUpdate { name: Some("x".into()) }.is_empty());
        assert!(TaskUpdate::default().is_empty());
        assert!(!TaskUpdate { status: Some(Status::Completed), ..Default::default() }.is_empty());
        assert!(!TaskUpdate { project_id: Some(2), ..Default::default() }.is_empty());
    }

    #[test]
    fn test_status_default_is_pending() {
        assert_eq!(Status::default(), Status::Pending);
        assert_eq!(NewTask::new("T", Status::default(), 1).status, Status::Pending);
    }
}
