//! Error types for `project_tracker`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Errors that can occur in the tracker.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `SQLite` database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// One or more input fields failed validation.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// An id did not resolve to a live record.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record that was looked up.
        entity: Entity,
        /// The id that was requested.
        id: i64,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for a missing project.
    #[must_use]
    pub const fn project_not_found(id: i64) -> Self {
        Self::NotFound { entity: Entity::Project, id }
    }

    /// Shorthand for a missing task.
    #[must_use]
    pub const fn task_not_found(id: i64) -> Self {
        Self::NotFound { entity: Entity::Task, id }
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The two record kinds the tracker stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    /// A project.
    Project,
    /// A task.
    Task,
}

impl Entity {
    /// Human-readable name, capitalised.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Task => "Task",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-field validation messages.
///
/// Fields are kept in a sorted map so responses are deterministic; each field
/// may carry several messages in the order they were recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an error set with a single field message.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
    }

    /// Returns true if no field has failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if the given field has at least one message.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Messages recorded for a field.
    #[must_use]
    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }

    /// Names of all failing fields, sorted.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Total number of messages across all fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// Borrow the underlying field map.
    #[must_use]
    pub const fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// Consume into the underlying field map.
    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.errors
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the collected errors if any field failed.
    pub fn into_result<T>(self, value: T) -> std::result::Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Summary line: the first message, plus a count of the remainder.
    #[must_use]
    pub fn summary(&self) -> String {
        let first = self.errors.values().flatten().next();
        match (first, self.len()) {
            (None, _) => "The given data was invalid.".to_string(),
            (Some(first), 1) => first.clone(),
            (Some(first), 2) => format!("{first} (and 1 more error)"),
            (Some(first), n) => format!("{first} (and {} more errors)", n - 1),
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<BTreeMap<String, Vec<String>>> for ValidationErrors {
    fn from(errors: BTreeMap<String, Vec<String>>) -> Self {
        Self { errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_collects_per_field() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("title", "The title field is required.");
        errors.add("status", "The selected status is invalid.");
        errors.add("title", "The title must not be greater than 255 characters.");

        assert_eq!(errors.len(), 3);
        assert!(errors.contains("title"));
        assert_eq!(errors.messages("title").len(), 2);
        assert!(errors.messages("project_id").is_empty());
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["status", "title"]);
    }

    #[test]
    fn test_validation_summary() {
        assert_eq!(ValidationErrors::new().summary(), "The given data was invalid.");

        let one = ValidationErrors::single("name", "The name field is required.");
        assert_eq!(one.summary(), "The name field is required.");

        let mut two = one.clone();
        two.add("other", "Other.");
        assert_eq!(two.summary(), "The name field is required. (and 1 more error)");

        let mut three = two.clone();
        three.add("more", "More.");
        assert_eq!(three.summary(), "More. (and 2 more errors)");
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ValidationErrors::new().into_result(5), Ok(5));
        assert!(ValidationErrors::single("a", "b").into_result(5).is_err());
    }

    #[test]
    fn test_serializes_as_field_map() {
        let errors = ValidationErrors::single("status", "The selected status is invalid.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"status": ["The selected status is invalid."]}));
    }

    #[test]
    fn test_not_found_display() {
        assert_eq!(Error::task_not_found(3).to_string(), "Task not found: 3");
        assert_eq!(Error::project_not_found(1).to_string(), "Project not found: 1");
    }
}
