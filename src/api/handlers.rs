//! HTTP handlers for the tracker API.
//!
//! The store is synchronous, so every handler hands its store work to
//! [`tokio::task::spawn_blocking`]. Existence checks and payload validation
//! run inside the same blocking call, before any write.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiErrorResponse;
use super::validation;
use crate::config::ServerConfig;
use crate::error::{Entity, Error};
use crate::resources::{
    DataEnvelope, Includes, MessageResponse, PaginatedEnvelope, ProjectResource,
    ProjectWithTasksResource, TaskResource,
};
use crate::tracker::{ListParams, Project, TrackerStore};

/// Result type for handlers.
pub type ApiResult<T> = std::result::Result<T, ApiErrorResponse>;

/// Shared application dependencies.
#[derive(Clone)]
pub struct AppState {
    /// Project and task storage.
    pub store: Arc<dyn TrackerStore + Send + Sync>,
    /// Server settings.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Creates a new `AppState`.
    #[must_use]
    pub fn new(store: Arc<dyn TrackerStore + Send + Sync>, config: ServerConfig) -> Self {
        Self { store, config: Arc::new(config) }
    }
}

/// Run store work on the blocking pool.
async fn blocking<T, F>(state: &AppState, work: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn TrackerStore) -> crate::Result<T> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    let result = tokio::task::spawn_blocking(move || work(store.as_ref())).await?;
    result.map_err(ApiErrorResponse::from)
}

/// Parse a path id. Anything that is not an integer names no record.
fn parse_id(raw: &str, entity: Entity) -> ApiResult<i64> {
    raw.parse().map_err(|_| ApiErrorResponse::not_found(format!("{entity} not found.")))
}

/// Unwrap the request body, turning a malformed one into a 4xx.
fn body(payload: std::result::Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    payload.map(|Json(value)| value).map_err(ApiErrorResponse::from)
}

// =============================================================================
// Projects
// =============================================================================

/// `GET /api/projects`: one page of projects with their task counts.
///
/// # Errors
///
/// 422 for invalid paging parameters.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PaginatedEnvelope<ProjectResource>>> {
    let query = params.clone().into_project_query(state.config.page_limits())?;
    let page = blocking(&state, move |store| store.list_projects(&query)).await?;
    let page =
        page.map(|summary| ProjectResource::from_summary(summary, Includes::WITH_TASKS_COUNT));
    Ok(Json(PaginatedEnvelope::from_page(page, "/api/projects", &params)))
}

/// `POST /api/projects`.
///
/// # Errors
///
/// 422 when the name is missing or invalid.
pub async fn create_project(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DataEnvelope<ProjectResource>>)> {
    let new_project = validation::new_project(&body(payload)?)?;
    let project = blocking(&state, move |store| store.create_project(&new_project)).await?;
    tracing::info!(project_id = project.id, "project created");
    Ok((StatusCode::CREATED, Json(DataEnvelope::new(ProjectResource::from_project(project)))))
}

/// `GET /api/projects/{id}`: the project with all of its tasks.
///
/// # Errors
///
/// 404 when the project does not exist.
pub async fn show_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataEnvelope<ProjectWithTasksResource>>> {
    let id = parse_id(&id, Entity::Project)?;
    let resource = blocking(&state, move |store| {
        let project = store.get_project(id)?.ok_or(Error::project_not_found(id))?;
        let tasks = store.tasks_for_project(id)?;
        Ok(ProjectWithTasksResource::new(project, tasks))
    })
    .await?;
    Ok(Json(DataEnvelope::new(resource)))
}

/// `PUT|PATCH /api/projects/{id}`.
///
/// # Errors
///
/// 404 when the project does not exist, 422 for an invalid name.
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<DataEnvelope<ProjectResource>>> {
    let id = parse_id(&id, Entity::Project)?;
    let payload = body(payload)?;
    let project = blocking(&state, move |store| {
        if !store.project_exists(id)? {
            return Err(Error::project_not_found(id));
        }
        let update = validation::project_update(&payload)?;
        store.update_project(id, update)?.ok_or(Error::project_not_found(id))
    })
    .await?;
    Ok(Json(DataEnvelope::new(ProjectResource::from_project(project))))
}

/// `DELETE /api/projects/{id}`: removes the project and its tasks.
///
/// # Errors
///
/// 404 when the project does not exist.
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, Entity::Project)?;
    let deleted = blocking(&state, move |store| store.delete_project(id)).await?;
    if !deleted {
        return Err(Error::project_not_found(id).into());
    }
    tracing::info!(project_id = id, "project deleted");
    Ok(Json(MessageResponse::new("Project deleted successfully")))
}

// =============================================================================
// Tasks
// =============================================================================

/// Load each distinct project referenced by `project_ids`.
fn load_projects(
    store: &dyn TrackerStore,
    project_ids: impl IntoIterator<Item = i64>,
) -> crate::Result<BTreeMap<i64, Project>> {
    let mut projects = BTreeMap::new();
    for id in project_ids {
        if projects.contains_key(&id) {
            continue;
        }
        if let Some(project) = store.get_project(id)? {
            projects.insert(id, project);
        }
    }
    Ok(projects)
}

/// `GET /api/tasks`: one page of tasks, each with its project.
///
/// # Errors
///
/// 422 for an invalid filter or paging parameter.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PaginatedEnvelope<TaskResource>>> {
    let query = params.clone().into_task_query(state.config.page_limits())?;
    let page = blocking(&state, move |store| {
        let page = store.list_tasks(&query)?;
        let projects = load_projects(store, page.items.iter().map(|t| t.project_id))?;
        let lookup = |id: i64| projects.get(&id).cloned();
        Ok(page.map(|task| TaskResource::with_includes(task, Includes::WITH_PROJECT, lookup)))
    })
    .await?;
    Ok(Json(PaginatedEnvelope::from_page(page, "/api/tasks", &params)))
}

/// `POST /api/tasks`.
///
/// # Errors
///
/// 422 listing every missing or invalid field.
pub async fn create_task(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DataEnvelope<TaskResource>>)> {
    let payload = body(payload)?;
    let task = blocking(&state, move |store| {
        let new_task = validation::new_task(&payload, |id| store.project_exists(id))?;
        store.create_task(&new_task)
    })
    .await?;
    tracing::info!(task_id = task.id, project_id = task.project_id, "task created");
    Ok((StatusCode::CREATED, Json(DataEnvelope::new(TaskResource::from_task(task, None)))))
}

/// `GET /api/tasks/{id}`: the task with its project.
///
/// # Errors
///
/// 404 when the task does not exist.
pub async fn show_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataEnvelope<TaskResource>>> {
    let id = parse_id(&id, Entity::Task)?;
    let resource = blocking(&state, move |store| {
        let task = store.get_task(id)?.ok_or(Error::task_not_found(id))?;
        let project = store.get_project(task.project_id)?;
        Ok(TaskResource::with_includes(task, Includes::WITH_PROJECT, |_| project))
    })
    .await?;
    Ok(Json(DataEnvelope::new(resource)))
}

/// `PUT|PATCH /api/tasks/{id}`: changes only the fields that were sent.
///
/// # Errors
///
/// 404 when the task does not exist, 422 for any invalid sent field.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<DataEnvelope<TaskResource>>> {
    let id = parse_id(&id, Entity::Task)?;
    let payload = body(payload)?;
    let task = blocking(&state, move |store| {
        if store.get_task(id)?.is_none() {
            return Err(Error::task_not_found(id));
        }
        let update = validation::task_update(&payload, |pid| store.project_exists(pid))?;
        store.update_task(id, update)?.ok_or(Error::task_not_found(id))
    })
    .await?;
    Ok(Json(DataEnvelope::new(TaskResource::from_task(task, None))))
}

/// `DELETE /api/tasks/{id}`.
///
/// # Errors
///
/// 404 when the task does not exist, including on a repeated delete.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, Entity::Task)?;
    let deleted = blocking(&state, move |store| store.delete_task(id)).await?;
    if !deleted {
        return Err(Error::task_not_found(id).into());
    }
    tracing::info!(task_id = id, "task deleted");
    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

// =============================================================================
// Health
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// Always `ok` when the server answers.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// `GET /api/health`.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".to_string(), version: crate::VERSION.to_string() })
}
