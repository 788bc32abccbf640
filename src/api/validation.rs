//! Request payload validation.
//!
//! Payloads are inspected as raw JSON so that a missing field, a field of the
//! wrong type, and an out-of-range value all come back as field messages in a
//! single 422 response. Creation checks every field; updates check only the
//! fields that were sent. Nothing here writes to the store.

use serde_json::{Map, Value};

use crate::error::{Result, ValidationErrors};
use crate::tracker::{NewProject, NewTask, ProjectUpdate, Status, TaskUpdate};

/// Longest accepted project name or task title, in characters.
pub const MAX_TEXT_LENGTH: usize = 255;

/// Validate a project creation payload.
///
/// # Errors
///
/// Returns the failing fields.
pub fn new_project(body: &Value) -> std::result::Result<NewProject, ValidationErrors> {
    let fields = object(body);
    let mut errors = ValidationErrors::new();
    let name = required_text(fields, "name", &mut errors);
    name.map(|name| NewProject { name }).ok_or(errors)
}

/// Validate a project update payload.
///
/// # Errors
///
/// Returns the failing fields.
pub fn project_update(body: &Value) -> std::result::Result<ProjectUpdate, ValidationErrors> {
    let fields = object(body);
    let mut errors = ValidationErrors::new();
    let name = if sent(fields, "name") { required_text(fields, "name", &mut errors) } else { None };
    errors.into_result(ProjectUpdate { name })
}

/// Validate a task creation payload.
///
/// `project_exists` is consulted only when `project_id` is a well-formed
/// integer.
///
/// # Errors
///
/// Returns [`crate::Error::Validation`] with the failing fields, or the
/// lookup's error if the existence check itself fails.
pub fn new_task(body: &Value, project_exists: impl Fn(i64) -> Result<bool>) -> Result<NewTask> {
    let fields = object(body);
    let mut errors = ValidationErrors::new();

    let title = required_text(fields, "title", &mut errors);
    let status = required_status(fields, &mut errors);
    let project_id = required_project_id(fields, &mut errors, &project_exists)?;

    match (title, status, project_id) {
        (Some(title), Some(status), Some(project_id)) => Ok(NewTask::new(title, status, project_id)),
        _ => Err(errors.into()),
    }
}

/// Validate a task update payload.
///
/// # Errors
///
/// Returns [`crate::Error::Validation`] with the failing fields, or the
/// lookup's error if the existence check itself fails.
pub fn task_update(
    body: &Value,
    project_exists: impl Fn(i64) -> Result<bool>,
) -> Result<TaskUpdate> {
    let fields = object(body);
    let mut errors = ValidationErrors::new();

    let title = if sent(fields, "title") { required_text(fields, "title", &mut errors) } else { None };
    let status = if sent(fields, "status") { required_status(fields, &mut errors) } else { None };
    let project_id = if sent(fields, "project_id") {
        required_project_id(fields, &mut errors, &project_exists)?
    } else {
        None
    };

    errors.into_result(TaskUpdate { title, status, project_id }).map_err(Into::into)
}

/// The payload's fields. Anything other than a JSON object has none.
fn object(body: &Value) -> Option<&Map<String, Value>> {
    body.as_object()
}

/// Whether the payload carries the key at all, even as null.
fn sent(fields: Option<&Map<String, Value>>, field: &str) -> bool {
    fields.is_some_and(|f| f.contains_key(field))
}

/// Field label used in messages: `project_id` reads as "project id".
fn label(field: &str) -> String {
    field.replace('_', " ")
}

/// A field counts as missing when absent, null, or a blank string.
fn lookup<'a>(fields: Option<&'a Map<String, Value>>, field: &str) -> Option<&'a Value> {
    match fields?.get(field)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        value => Some(value),
    }
}

fn required_text(
    fields: Option<&Map<String, Value>>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let label = label(field);
    let Some(value) = lookup(fields, field) else {
        errors.add(field, format!("The {label} field is required."));
        return None;
    };
    let Some(text) = value.as_str() else {
        errors.add(field, format!("The {label} must be a string."));
        return None;
    };
    let text = text.trim();
    if text.chars().count() > MAX_TEXT_LENGTH {
        errors.add(
            field,
            format!("The {label} must not be greater than {MAX_TEXT_LENGTH} characters."),
        );
        return None;
    }
    Some(text.to_string())
}

fn required_status(
    fields: Option<&Map<String, Value>>,
    errors: &mut ValidationErrors,
) -> Option<Status> {
    let Some(value) = lookup(fields, "status") else {
        errors.add("status", "The status field is required.");
        return None;
    };
    match value.as_str().map(Status::from_str) {
        Some(Ok(status)) => Some(status),
        _ => {
            errors.add("status", "The selected status is invalid.");
            None
        }
    }
}

fn required_project_id(
    fields: Option<&Map<String, Value>>,
    errors: &mut ValidationErrors,
    project_exists: &impl Fn(i64) -> Result<bool>,
) -> Result<Option<i64>> {
    let Some(value) = lookup(fields, "project_id") else {
        errors.add("project_id", "The project id field is required.");
        return Ok(None);
    };
    let id = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    let Some(id) = id else {
        errors.add("project_id", "The project id must be an integer.");
        return Ok(None);
    };
    if !project_exists(id)? {
        errors.add("project_id", "The selected project id is invalid.");
        return Ok(None);
    }
    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rstest::rstest;
    use serde_json::json;

    fn exists(id: i64) -> Result<bool> {
        Ok(id == 1)
    }

    fn task_errors(body: &Value) -> ValidationErrors {
        match new_task(body, exists) {
            Err(Error::Validation(errors)) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_new_project_valid() {
        let project = new_project(&json!({"name": "  Website  "})).unwrap();
        assert_eq!(project.name, "Website");
    }

    #[rstest]
    #[case(json!({}), "The name field is required.")]
    #[case(json!({"name": ""}), "The name field is required.")]
    #[case(json!({"name": "   "}), "The name field is required.")]
    #[case(json!({"name": null}), "The name field is required.")]
    #[case(json!({"name": 42}), "The name must be a string.")]
    #[case(json!({"name": "x".repeat(256)}), "The name must not be greater than 255 characters.")]
    #[case(json!([1, 2]), "The name field is required.")]
    fn test_new_project_invalid(#[case] body: Value, #[case] message: &str) {
        let errors = new_project(&body).unwrap_err();
        assert_eq!(errors.messages("name"), [message.to_string()]);
    }

    #[test]
    fn test_name_at_limit_is_accepted() {
        let name = "é".repeat(MAX_TEXT_LENGTH);
        assert_eq!(new_project(&json!({ "name": name })).unwrap().name, name);
    }

    #[test]
    fn test_project_update_only_checks_sent_fields() {
        assert!(project_update(&json!({})).unwrap().is_empty());
        assert_eq!(project_update(&json!({"name": "New"})).unwrap().name.as_deref(), Some("New"));
        let errors = project_update(&json!({"name": ""})).unwrap_err();
        assert!(errors.contains("name"));
    }

    #[test]
    fn test_new_task_valid() {
        let task = new_task(&json!({"title": "T", "status": "completed", "project_id": 1}), exists)
            .unwrap();
        assert_eq!(task.title, "T");
        assert_eq!(task.status, Status::Completed);
        assert_eq!(task.project_id, 1);

        let from_string =
            new_task(&json!({"title": "T", "status": "pending", "project_id": "1"}), exists).unwrap();
        assert_eq!(from_string.project_id, 1);
    }

    #[test]
    fn test_new_task_reports_every_missing_field() {
        let errors = task_errors(&json!({}));
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["project_id", "status", "title"]);
    }

    #[rstest]
    #[case(json!({"title": "T", "status": "invalid_status", "project_id": 1}), "status", "The selected status is invalid.")]
    #[case(json!({"title": "T", "status": "in_progress", "project_id": 1}), "status", "The selected status is invalid.")]
    #[case(json!({"title": "T", "status": 3, "project_id": 1}), "status", "The selected status is invalid.")]
    #[case(json!({"title": "T", "status": "pending", "project_id": 99}), "project_id", "The selected project id is invalid.")]
    #[case(json!({"title": "T", "status": "pending", "project_id": "abc"}), "project_id", "The project id must be an integer.")]
    #[case(json!({"title": "T", "status": "pending", "project_id": 1.5}), "project_id", "The project id must be an integer.")]
    fn test_new_task_invalid_field(#[case] body: Value, #[case] field: &str, #[case] message: &str) {
        let errors = task_errors(&body);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.messages(field), [message.to_string()]);
    }

    #[test]
    fn test_existence_check_skipped_for_malformed_id() {
        let body = json!({"title": "T", "status": "pending", "project_id": "abc"});
        let result = new_task(&body, |_| panic!("lookup should not run"));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_lookup_failure_propagates() {
        let body = json!({"title": "T", "status": "pending", "project_id": 1});
        let result = new_task(&body, |_| Err(Error::Config("store down".into())));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_task_update_partial() {
        let update = task_update(&json!({"status": "completed"}), exists).unwrap();
        assert_eq!(update, TaskUpdate { status: Some(Status::Completed), ..Default::default() });

        let empty = task_update(&json!({}), exists).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_task_update_validates_sent_fields() {
        let result = task_update(&json!({"title": "", "project_id": 42}), exists);
        let Err(Error::Validation(errors)) = result else { panic!("expected validation error") };
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["project_id", "title"]);
    }
}
