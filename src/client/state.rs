//! Client-side list/detail state and its reducer.
//!
//! Each entity kind keeps one [`SliceState`]. Every change goes through
//! [`reduce`], a pure function of the previous state and an [`Action`], so
//! the whole state machine is testable without a network.
//!
//! Async operations produce three actions: `*Pending` when the request
//! starts, then exactly one of `*Fulfilled` or `*Rejected`. List requests
//! carry a sequence number; a response older than the latest request is
//! discarded so a slow, superseded search cannot overwrite a newer one.

use std::fmt::Debug;

use crate::client::service::{ProjectForm, ServiceError, TaskForm};
use crate::error::ValidationErrors;
use crate::resources::{
    PageMeta, PaginatedEnvelope, ProjectResource, ProjectWithTasksResource, TaskResource,
};
use crate::tracker::query::DEFAULT_PER_PAGE;
use crate::tracker::{ListParams, Status};

/// An entity kind the client keeps a slice for.
///
/// Implemented by uninhabited marker types; the supertraits let derived
/// impls on [`SliceState`] and [`Action`] apply.
pub trait Entity: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Row shown in lists, and returned by create and update.
    type Item: Clone + Debug + PartialEq + Send + Sync;
    /// Record shown on the detail view.
    type Detail: Clone + Debug + PartialEq + Send + Sync;
    /// Active list filters.
    type Filters: Clone + Debug + Default + PartialEq + Send + Sync;
    /// A single change to the filters.
    type FilterChange: Clone + Debug + PartialEq + Send;
    /// Form contents.
    type Form: Clone + Debug + Default + PartialEq + Send + Sync;
    /// A single change to the form.
    type FormChange: Clone + Debug + PartialEq + Send;

    /// Id of a list row.
    fn item_id(item: &Self::Item) -> i64;

    /// Id of a detail record.
    fn detail_id(detail: &Self::Detail) -> i64;

    /// Detail to show after `updated` was saved. `current` is what the
    /// detail view held before.
    fn detail_after_update(current: Option<Self::Detail>, updated: &Self::Item) -> Self::Detail;

    /// Apply one filter change.
    fn apply_filter(filters: &mut Self::Filters, change: Self::FilterChange);

    /// Apply one form change.
    fn apply_form(form: &mut Self::Form, change: Self::FormChange);

    /// Current search text.
    fn search(filters: &Self::Filters) -> &str;

    /// Filter change that sets the search text.
    fn search_change(search: String) -> Self::FilterChange;

    /// Query parameters for a list request.
    fn list_params(filters: &Self::Filters, page: u32, per_page: u32) -> ListParams;
}

/// Pagination metadata from the last list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based current page.
    pub current_page: u32,
    /// Last page, at least 1.
    pub last_page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Matching items across all pages.
    pub total: u64,
    /// 1-based index of the first item on the page, `None` when it is empty.
    pub from: Option<u64>,
    /// 1-based index of the last item on the page, `None` when it is empty.
    pub to: Option<u64>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            last_page: 1,
            per_page: DEFAULT_PER_PAGE,
            total: 0,
            from: None,
            to: None,
        }
    }
}

impl From<PageMeta> for Pagination {
    fn from(meta: PageMeta) -> Self {
        Self {
            current_page: meta.current_page,
            last_page: meta.last_page,
            per_page: meta.per_page,
            total: meta.total,
            from: meta.from,
            to: meta.to,
        }
    }
}

/// State of one entity kind.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceState<E: Entity> {
    /// Rows of the current list page.
    pub list: Vec<E::Item>,
    /// Record on the detail view, if any.
    pub current_item: Option<E::Detail>,
    /// Whether a request is in flight.
    pub loading: bool,
    /// Message of the last failed request.
    pub error: Option<String>,
    /// Metadata of the current list page.
    pub pagination: Pagination,
    /// Active list filters.
    pub filters: E::Filters,
    /// Form contents.
    pub form_data: E::Form,
    /// Field errors from the last rejected save.
    pub form_errors: ValidationErrors,
    /// Sequence number of the latest list request.
    pub list_seq: u64,
}

impl<E: Entity> Default for SliceState<E> {
    fn default() -> Self {
        Self {
            list: Vec::new(),
            current_item: None,
            loading: false,
            error: None,
            pagination: Pagination::default(),
            filters: E::Filters::default(),
            form_data: E::Form::default(),
            form_errors: ValidationErrors::new(),
            list_seq: 0,
        }
    }
}

/// Everything that can change a [`SliceState`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action<E: Entity> {
    /// List request `seq` started.
    ListPending {
        /// Request sequence number.
        seq: u64,
    },
    /// List request `seq` succeeded.
    ListFulfilled {
        /// Request sequence number.
        seq: u64,
        /// The page received.
        page: PaginatedEnvelope<E::Item>,
    },
    /// List request `seq` failed.
    ListRejected {
        /// Request sequence number.
        seq: u64,
        /// The failure.
        error: ServiceError,
    },
    /// Detail request started.
    ShowPending,
    /// Detail request succeeded.
    ShowFulfilled(E::Detail),
    /// Detail request failed.
    ShowRejected(ServiceError),
    /// Create request started.
    CreatePending,
    /// Create request succeeded.
    CreateFulfilled(E::Item),
    /// Create request failed.
    CreateRejected(ServiceError),
    /// Update request started.
    UpdatePending,
    /// Update request succeeded.
    UpdateFulfilled(E::Item),
    /// Update request failed.
    UpdateRejected(ServiceError),
    /// Delete request started.
    DeletePending,
    /// Delete of the given id succeeded.
    DeleteFulfilled(i64),
    /// Delete request failed.
    DeleteRejected(ServiceError),
    /// Dismiss the error message.
    ClearError,
    /// Dismiss field errors.
    ClearFormErrors,
    /// Change one form field.
    UpdateFormData(E::FormChange),
    /// Replace the whole form, e.g. when editing an existing record.
    SetFormData(E::Form),
    /// Empty the form.
    ResetFormData,
    /// Change one filter.
    UpdateFilters(E::FilterChange),
    /// Remove every filter.
    ClearFilters,
    /// Set or clear the detail record.
    SetCurrentItem(Option<E::Detail>),
}

/// Compute the state after `action`.
#[must_use]
pub fn reduce<E: Entity>(mut state: SliceState<E>, action: Action<E>) -> SliceState<E> {
    match action {
        Action::ListPending { seq } => {
            state.list_seq = state.list_seq.max(seq);
            start(&mut state);
        }
        Action::ListFulfilled { seq, page } => {
            if seq >= state.list_seq {
                state.loading = false;
                state.list = page.data;
                state.pagination = page.meta.into();
            }
        }
        Action::ListRejected { seq, error } => {
            if seq >= state.list_seq {
                fail(&mut state, &error);
            }
        }
        Action::ShowPending | Action::DeletePending => start(&mut state),
        Action::CreatePending | Action::UpdatePending => {
            start(&mut state);
            state.form_errors = ValidationErrors::new();
        }
        Action::ShowFulfilled(detail) => {
            state.loading = false;
            state.current_item = Some(detail);
        }
        Action::CreateFulfilled(item) => {
            state.loading = false;
            state.list.push(item);
            state.form_data = E::Form::default();
            state.form_errors = ValidationErrors::new();
        }
        Action::UpdateFulfilled(item) => {
            state.loading = false;
            let id = E::item_id(&item);
            if let Some(row) = state.list.iter_mut().find(|row| E::item_id(row) == id) {
                *row = item.clone();
            }
            state.current_item = Some(E::detail_after_update(state.current_item.take(), &item));
            state.form_errors = ValidationErrors::new();
        }
        Action::DeleteFulfilled(id) => {
            state.loading = false;
            state.list.retain(|row| E::item_id(row) != id);
            if state.current_item.as_ref().is_some_and(|d| E::detail_id(d) == id) {
                state.current_item = None;
            }
        }
        Action::ShowRejected(error) | Action::DeleteRejected(error) => fail(&mut state, &error),
        Action::CreateRejected(error) | Action::UpdateRejected(error) => {
            fail(&mut state, &error);
            state.form_errors = error.field_errors();
        }
        Action::ClearError => state.error = None,
        Action::ClearFormErrors => state.form_errors = ValidationErrors::new(),
        Action::UpdateFormData(change) => E::apply_form(&mut state.form_data, change),
        Action::SetFormData(form) => state.form_data = form,
        Action::ResetFormData => {
            state.form_data = E::Form::default();
            state.form_errors = ValidationErrors::new();
        }
        Action::UpdateFilters(change) => E::apply_filter(&mut state.filters, change),
        Action::ClearFilters => state.filters = E::Filters::default(),
        Action::SetCurrentItem(detail) => state.current_item = detail,
    }
    state
}

fn start<E: Entity>(state: &mut SliceState<E>) {
    state.loading = true;
    state.error = None;
}

fn fail<E: Entity>(state: &mut SliceState<E>, error: &ServiceError) {
    state.loading = false;
    state.error = Some(error.message().to_string());
}

// =============================================================================
// Projects
// =============================================================================

/// Project entity marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projects {}

/// Project list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilters {
    /// Name search text.
    pub search: String,
}

/// A change to [`ProjectFilters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectFilterChange {
    /// Set the search text.
    Search(String),
}

/// A change to [`ProjectForm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectFormChange {
    /// Set the name.
    Name(String),
}

impl Entity for Projects {
    type Item = ProjectResource;
    type Detail = ProjectWithTasksResource;
    type Filters = ProjectFilters;
    type FilterChange = ProjectFilterChange;
    type Form = ProjectForm;
    type FormChange = ProjectFormChange;

    fn item_id(item: &ProjectResource) -> i64 {
        item.id
    }

    fn detail_id(detail: &ProjectWithTasksResource) -> i64 {
        detail.id
    }

    /// Keeps the known task list when the detail view already shows this
    /// project; otherwise the tasks are unknown until the next fetch.
    fn detail_after_update(
        current: Option<ProjectWithTasksResource>,
        updated: &ProjectResource,
    ) -> ProjectWithTasksResource {
        let tasks = current.filter(|c| c.id == updated.id).map(|c| c.tasks).unwrap_or_default();
        ProjectWithTasksResource {
            id: updated.id,
            name: updated.name.clone(),
            tasks_count: tasks.len() as u64,
            tasks,
            created_at: updated.created_at,
            updated_at: updated.updated_at,
        }
    }

    fn apply_filter(filters: &mut ProjectFilters, change: ProjectFilterChange) {
        match change {
            ProjectFilterChange::Search(search) => filters.search = search,
        }
    }

    fn apply_form(form: &mut ProjectForm, change: ProjectFormChange) {
        match change {
            ProjectFormChange::Name(name) => form.name = name,
        }
    }

    fn search(filters: &ProjectFilters) -> &str {
        &filters.search
    }

    fn search_change(search: String) -> ProjectFilterChange {
        ProjectFilterChange::Search(search)
    }

    fn list_params(filters: &ProjectFilters, page: u32, per_page: u32) -> ListParams {
        ListParams {
            search: non_empty(&filters.search),
            page: Some(page.to_string()),
            per_page: Some(per_page.to_string()),
            ..ListParams::default()
        }
    }
}

// =============================================================================
// Tasks
// =============================================================================

/// Task entity marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tasks {}

/// Task list filters. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilters {
    /// Title search text.
    pub search: String,
    /// Status filter.
    pub status: Option<Status>,
    /// Project filter.
    pub project_id: Option<i64>,
}

/// A change to [`TaskFilters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFilterChange {
    /// Set the search text.
    Search(String),
    /// Set or clear the status filter.
    Status(Option<Status>),
    /// Set or clear the project filter.
    Project(Option<i64>),
}

/// A change to [`TaskForm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFormChange {
    /// Set the title.
    Title(String),
    /// Set the status.
    Status(Status),
    /// Set or clear the project.
    Project(Option<i64>),
}

impl Entity for Tasks {
    type Item = TaskResource;
    type Detail = TaskResource;
    type Filters = TaskFilters;
    type FilterChange = TaskFilterChange;
    type Form = TaskForm;
    type FormChange = TaskFormChange;

    fn item_id(item: &TaskResource) -> i64 {
        item.id
    }

    fn detail_id(detail: &TaskResource) -> i64 {
        detail.id
    }

    /// Update responses carry no embedded project; keep the one already
    /// shown if the task still belongs to it.
    fn detail_after_update(current: Option<TaskResource>, updated: &TaskResource) -> TaskResource {
        let mut detail = updated.clone();
        if detail.project.is_none() {
            detail.project = current
                .and_then(|c| c.project)
                .filter(|project| project.id == updated.project_id);
        }
        detail
    }

    fn apply_filter(filters: &mut TaskFilters, change: TaskFilterChange) {
        match change {
            TaskFilterChange::Search(search) => filters.search = search,
            TaskFilterChange::Status(status) => filters.status = status,
            TaskFilterChange::Project(project_id) => filters.project_id = project_id,
        }
    }

    fn apply_form(form: &mut TaskForm, change: TaskFormChange) {
        match change {
            TaskFormChange::Title(title) => form.title = title,
            TaskFormChange::Status(status) => form.status = status,
            TaskFormChange::Project(project_id) => form.project_id = project_id,
        }
    }

    fn search(filters: &TaskFilters) -> &str {
        &filters.search
    }

    fn search_change(search: String) -> TaskFilterChange {
        TaskFilterChange::Search(search)
    }

    fn list_params(filters: &TaskFilters, page: u32, per_page: u32) -> ListParams {
        ListParams {
            search: non_empty(&filters.search),
            status: filters.status.map(|s| s.as_str().to_string()),
            project_id: filters.project_id.map(|id| id.to_string()),
            page: Some(page.to_string()),
            per_page: Some(per_page.to_string()),
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
