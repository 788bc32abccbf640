//! Wire representations of projects and tasks.
//!
//! Each record has one canonical shape. Relations are attached only when the
//! caller asks for them through [`Includes`], so a list of tasks carries its
//! projects while a freshly updated task does not. Every type here also
//! implements `Deserialize`, which lets the client decode exactly what the
//! server encodes.

use crate::error::ValidationErrors;
use crate::tracker::{ListParams, Page, Project, ProjectSummary, Status, Task};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Relations requested for a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Includes {
    /// Attach the owning project to each task.
    pub project: bool,
    /// Attach the task list to a project.
    pub tasks: bool,
    /// Attach the task count to a project.
    pub tasks_count: bool,
}

impl Includes {
    /// No relations.
    pub const NONE: Self = Self { project: false, tasks: false, tasks_count: false };

    /// Tasks with their owning project.
    pub const WITH_PROJECT: Self = Self { project: true, tasks: false, tasks_count: false };

    /// Projects with their task count.
    pub const WITH_TASKS_COUNT: Self = Self { project: false, tasks: false, tasks_count: true };
}

/// A project as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectResource {
    /// Identifier.
    pub id: i64,
    /// Name.
    pub name: String,
    /// Number of tasks, present only when counted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks_count: Option<u64>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl ProjectResource {
    /// A project without relations.
    #[must_use]
    pub fn from_project(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            tasks_count: None,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }

    /// A listed project; the count is attached if requested.
    #[must_use]
    pub fn from_summary(summary: ProjectSummary, includes: Includes) -> Self {
        let tasks_count = includes.tasks_count.then_some(summary.tasks_count);
        Self { tasks_count, ..Self::from_project(summary.project) }
    }
}

/// A project with every one of its tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectWithTasksResource {
    /// Identifier.
    pub id: i64,
    /// Name.
    pub name: String,
    /// The project's tasks, without their project attached.
    pub tasks: Vec<TaskResource>,
    /// Always `tasks.len()`.
    pub tasks_count: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl ProjectWithTasksResource {
    /// Build from a project and its tasks.
    #[must_use]
    pub fn new(project: Project, tasks: Vec<Task>) -> Self {
        let tasks: Vec<TaskResource> =
            tasks.into_iter().map(|task| TaskResource::from_task(task, None)).collect();
        Self {
            id: project.id,
            name: project.name,
            tasks_count: tasks.len() as u64,
            tasks,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

/// A task as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResource {
    /// Identifier.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Status.
    pub status: Status,
    /// Owning project id.
    pub project_id: i64,
    /// Owning project, present only when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectResource>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl TaskResource {
    /// Build from a task and, optionally, its loaded project.
    #[must_use]
    pub fn from_task(task: Task, project: Option<Project>) -> Self {
        Self {
            id: task.id,
            title: task.title,
            status: task.status,
            project_id: task.project_id,
            project: project.map(ProjectResource::from_project),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }

    /// Build from a task, looking up its project only if requested.
    ///
    /// The lookup result is dropped when `includes.project` is false.
    #[must_use]
    pub fn with_includes(
        task: Task,
        includes: Includes,
        lookup: impl FnOnce(i64) -> Option<Project>,
    ) -> Self {
        let project = if includes.project { lookup(task.project_id) } else { None };
        Self::from_task(task, project)
    }
}

/// `{"data": ...}` wrapper for single records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    /// The record.
    pub data: T,
}

impl<T> DataEnvelope<T> {
    /// Wrap a record.
    pub const fn new(data: T) -> Self {
        Self { data }
    }
}

/// `{"message": ...}` body for deletes and errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Build a message body.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Error body: a message, plus per-field messages for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Summary message.
    pub message: String,
    /// Field-level messages, present only for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl ErrorResponse {
    /// A message-only error body.
    pub fn message(message: impl Into<String>) -> Self {
        Self { message: message.into(), errors: None }
    }

    /// A validation error body summarising `errors`.
    #[must_use]
    pub fn validation(errors: ValidationErrors) -> Self {
        Self { message: errors.summary(), errors: Some(errors) }
    }
}

/// Navigation links for a paginated list. Relative URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    /// Page 1.
    pub first: String,
    /// The last page.
    pub last: String,
    /// Previous page, null on page 1.
    pub prev: Option<String>,
    /// Next page, null on or past the last page.
    pub next: Option<String>,
}

/// Pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Requested page.
    pub current_page: u32,
    /// `max(1, ceil(total / per_page))`.
    pub last_page: u32,
    /// Page size.
    pub per_page: u32,
    /// Matches across all pages.
    pub total: u64,
    /// 1-based index of the first item, null when the page is empty.
    pub from: Option<u64>,
    /// 1-based index of the last item, null when the page is empty.
    pub to: Option<u64>,
}

/// A page of records with links and metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedEnvelope<T> {
    /// Records on this page.
    pub data: Vec<T>,
    /// Navigation links.
    pub links: PageLinks,
    /// Pagination metadata.
    pub meta: PageMeta,
}

impl<T> PaginatedEnvelope<T> {
    /// Wrap a page.
    ///
    /// `path` is the list endpoint (e.g. `/api/tasks`); every link repeats
    /// the active filters from `params` and only changes `page`.
    pub fn from_page(page: Page<T>, path: &str, params: &ListParams) -> Self {
        let last_page = page.last_page();
        let meta = PageMeta {
            current_page: page.current_page,
            last_page,
            per_page: page.per_page,
            total: page.total,
            from: page.from(),
            to: page.to(),
        };
        let current = page.current_page;
        let links = PageLinks {
            first: page_url(path, params, 1),
            last: page_url(path, params, last_page),
            prev: (current > 1).then(|| page_url(path, params, current - 1)),
            next: (current < last_page).then(|| page_url(path, params, current + 1)),
        };
        Self { data: page.items, links, meta }
    }
}

/// Relative URL for one page of a list, keeping every other parameter.
#[must_use]
pub fn page_url(path: &str, params: &ListParams, page: u32) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params.to_pairs() {
        if key != "page" {
            query.append_pair(key, &value);
        }
    }
    query.append_pair("page", &page.to_string());
    format!("{path}?{}", query.finish())
}
