//! Remote tracker API access.
//!
//! [`TrackerService`] is the seam between client state and the network.
//! [`HttpTrackerService`] talks to a running server with `reqwest`; tests
//! substitute their own implementations.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::ValidationErrors;
use crate::resources::{
    DataEnvelope, ErrorResponse, MessageResponse, PaginatedEnvelope, ProjectResource,
    ProjectWithTasksResource, TaskResource,
};
use crate::tracker::{ListParams, Status};

/// Failure of a remote call, as the client needs to present it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The server rejected the payload (422).
    #[error("{message}")]
    Validation {
        /// Summary message from the server.
        message: String,
        /// Field-level messages.
        errors: ValidationErrors,
    },

    /// The record does not exist (404).
    #[error("{message}")]
    NotFound {
        /// Message from the server.
        message: String,
    },

    /// Anything else: transport failures, 5xx, unexpected bodies.
    #[error("{message}")]
    Transient {
        /// Human-readable description.
        message: String,
    },
}

impl ServiceError {
    /// Message suitable for display.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::NotFound { message }
            | Self::Transient { message } => message,
        }
    }

    /// Field errors, empty unless this is a validation failure.
    #[must_use]
    pub fn field_errors(&self) -> ValidationErrors {
        match self {
            Self::Validation { errors, .. } => errors.clone(),
            _ => ValidationErrors::new(),
        }
    }

    /// Create a transient error.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient { message: message.into() }
    }

    /// Classify a non-success response.
    #[must_use]
    pub fn from_status(status: StatusCode, body: Option<ErrorResponse>) -> Self {
        match (status, body) {
            (StatusCode::UNPROCESSABLE_ENTITY, Some(body)) => Self::Validation {
                message: body.message,
                errors: body.errors.unwrap_or_default(),
            },
            (StatusCode::UNPROCESSABLE_ENTITY, None) => Self::Validation {
                message: "The given data was invalid.".to_string(),
                errors: ValidationErrors::new(),
            },
            (StatusCode::NOT_FOUND, body) => Self::NotFound {
                message: body.map_or_else(|| "Not found.".to_string(), |b| b.message),
            },
            (_, Some(body)) => Self::transient(body.message),
            (status, None) => Self::transient(format!("Request failed with status {status}")),
        }
    }
}

/// Result type for remote calls.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Fields of the project form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectForm {
    /// Project name.
    pub name: String,
}

/// Fields of the task form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskForm {
    /// Task title.
    pub title: String,
    /// Task status.
    pub status: Status,
    /// Owning project, unset until one is chosen.
    pub project_id: Option<i64>,
}

/// Operations the client performs against the API.
#[async_trait]
pub trait TrackerService: Send + Sync {
    /// One page of projects with task counts.
    async fn list_projects(
        &self,
        params: &ListParams,
    ) -> ServiceResult<PaginatedEnvelope<ProjectResource>>;

    /// A project with all of its tasks.
    async fn get_project(&self, id: i64) -> ServiceResult<ProjectWithTasksResource>;

    /// Create a project.
    async fn create_project(&self, form: &ProjectForm) -> ServiceResult<ProjectResource>;

    /// Update a project.
    async fn update_project(&self, id: i64, form: &ProjectForm) -> ServiceResult<ProjectResource>;

    /// Delete a project and its tasks.
    async fn delete_project(&self, id: i64) -> ServiceResult<()>;

    /// One page of tasks, each with its project.
    async fn list_tasks(
        &self,
        params: &ListParams,
    ) -> ServiceResult<PaginatedEnvelope<TaskResource>>;

    /// A task with its project.
    async fn get_task(&self, id: i64) -> ServiceResult<TaskResource>;

    /// Create a task.
    async fn create_task(&self, form: &TaskForm) -> ServiceResult<TaskResource>;

    /// Update a task.
    async fn update_task(&self, id: i64, form: &TaskForm) -> ServiceResult<TaskResource>;

    /// Delete a task.
    async fn delete_task(&self, id: i64) -> ServiceResult<()>;
}

/// [`TrackerService`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTrackerService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTrackerService {
    /// Create a service for the API rooted at `base_url`, e.g.
    /// `http://localhost:8000/api`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client: reqwest::Client::new(), base_url }
    }

    /// Create a service from client configuration.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.base_url.clone())
    }

    /// The API root this service talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ServiceResult<T> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ServiceError::transient(format!("Request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ServiceError::transient(format!("Invalid response body: {e}")));
        }

        let body = response.json::<ErrorResponse>().await.ok();
        let error = ServiceError::from_status(status, body);
        tracing::debug!(%status, error = error.message(), "API call failed");
        Err(error)
    }

    async fn data<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ServiceResult<T> {
        self.send::<DataEnvelope<T>>(request).await.map(|envelope| envelope.data)
    }

    async fn delete(&self, path: &str) -> ServiceResult<()> {
        self.send::<MessageResponse>(self.client.delete(self.url(path))).await.map(|_| ())
    }
}

#[async_trait]
impl TrackerService for HttpTrackerService {
    async fn list_projects(
        &self,
        params: &ListParams,
    ) -> ServiceResult<PaginatedEnvelope<ProjectResource>> {
        self.send(self.client.get(self.url("/projects")).query(&params.to_pairs())).await
    }

    async fn get_project(&self, id: i64) -> ServiceResult<ProjectWithTasksResource> {
        self.data(self.client.get(self.url(&format!("/projects/{id}")))).await
    }

    async fn create_project(&self, form: &ProjectForm) -> ServiceResult<ProjectResource> {
        self.data(self.client.post(self.url("/projects")).json(form)).await
    }

    async fn update_project(&self, id: i64, form: &ProjectForm) -> ServiceResult<ProjectResource> {
        self.data(self.client.put(self.url(&format!("/projects/{id}"))).json(form)).await
    }

    async fn delete_project(&self, id: i64) -> ServiceResult<()> {
        self.delete(&format!("/projects/{id}")).await
    }

    async fn list_tasks(
        &self,
        params: &ListParams,
    ) -> ServiceResult<PaginatedEnvelope<TaskResource>> {
        self.send(self.client.get(self.url("/tasks")).query(&params.to_pairs())).await
    }

    async fn get_task(&self, id: i64) -> ServiceResult<TaskResource> {
        self.data(self.client.get(self.url(&format!("/tasks/{id}")))).await
    }

    async fn create_task(&self, form: &TaskForm) -> ServiceResult<TaskResource> {
        self.data(self.client.post(self.url("/tasks")).json(form)).await
    }

    async fn update_task(&self, id: i64, form: &TaskForm) -> ServiceResult<TaskResource> {
        self.data(self.client.put(self.url(&format!("/tasks/{id}"))).json(form)).await
    }

    async fn delete_task(&self, id: i64) -> ServiceResult<()> {
        self.delete(&format!("/tasks/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_validation_error_keeps_field_messages() {
        let errors = ValidationErrors::single("name", "The name field is required.");
        let body = ErrorResponse::validation(errors.clone());
        let error = ServiceError::from_status(StatusCode::UNPROCESSABLE_ENTITY, Some(body));
        assert_eq!(error.message(), "The name field is required.");
        assert_eq!(error.field_errors(), errors);
    }

    #[rstest]
    #[case(StatusCode::NOT_FOUND, Some("Task not found."), "Task not found.")]
    #[case(StatusCode::NOT_FOUND, None, "Not found.")]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, Some("Server Error"), "Server Error")]
    #[case(StatusCode::BAD_GATEWAY, None, "Request failed with status 502 Bad Gateway")]
    fn test_status_classification(
        #[case] status: StatusCode,
        #[case] body: Option<&str>,
        #[case] expected: &str,
    ) {
        let error = ServiceError::from_status(status, body.map(ErrorResponse::message));
        assert_eq!(error.message(), expected);
        assert!(error.field_errors().is_empty());
        assert_eq!(matches!(error, ServiceError::NotFound { .. }), status == StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_task_form_serializes_status_lowercase() {
        let form =
            TaskForm { title: "Write".into(), status: Status::Completed, project_id: Some(3) };
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"title": "Write", "status": "completed", "project_id": 3})
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let service = HttpTrackerService::new("http://localhost:8000/api/");
        assert_eq!(service.base_url(), "http://localhost:8000/api");
        assert_eq!(service.url("/tasks"), "http://localhost:8000/api/tasks");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transient() {
        let service = HttpTrackerService::new("http://127.0.0.1:9/api");
        let error = service.get_task(1).await.unwrap_err();
        assert!(matches!(error, ServiceError::Transient { .. }));
    }
}
