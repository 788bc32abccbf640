//! Async operations that drive a [`SliceState`] through its reducer.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::client::service::{ProjectForm, ServiceResult, TaskForm, TrackerService};
use crate::client::state::{reduce, Action, Entity, Projects, SliceState, Tasks};
use crate::resources::{
    PaginatedEnvelope, ProjectResource, ProjectWithTasksResource, TaskResource,
};
use crate::tracker::ListParams;

/// Maps an entity kind onto its [`TrackerService`] calls.
#[async_trait]
pub trait RemoteEntity: Entity {
    /// Fetch one list page.
    async fn fetch_list(
        service: &dyn TrackerService,
        params: &ListParams,
    ) -> ServiceResult<PaginatedEnvelope<Self::Item>>;

    /// Fetch one record for the detail view.
    async fn fetch_one(service: &dyn TrackerService, id: i64) -> ServiceResult<Self::Detail>;

    /// Create a record from the form.
    async fn create(service: &dyn TrackerService, form: &Self::Form) -> ServiceResult<Self::Item>;

    /// Update a record from the form.
    async fn update(
        service: &dyn TrackerService,
        id: i64,
        form: &Self::Form,
    ) -> ServiceResult<Self::Item>;

    /// Delete a record.
    async fn delete(service: &dyn TrackerService, id: i64) -> ServiceResult<()>;
}

#[async_trait]
impl RemoteEntity for Projects {
    async fn fetch_list(
        service: &dyn TrackerService,
        params: &ListParams,
    ) -> ServiceResult<PaginatedEnvelope<ProjectResource>> {
        service.list_projects(params).await
    }

    async fn fetch_one(
        service: &dyn TrackerService,
        id: i64,
    ) -> ServiceResult<ProjectWithTasksResource> {
        service.get_project(id).await
    }

    async fn create(
        service: &dyn TrackerService,
        form: &ProjectForm,
    ) -> ServiceResult<ProjectResource> {
        service.create_project(form).await
    }

    async fn update(
        service: &dyn TrackerService,
        id: i64,
        form: &ProjectForm,
    ) -> ServiceResult<ProjectResource> {
        service.update_project(id, form).await
    }

    async fn delete(service: &dyn TrackerService, id: i64) -> ServiceResult<()> {
        service.delete_project(id).await
    }
}

#[async_trait]
impl RemoteEntity for Tasks {
    async fn fetch_list(
        service: &dyn TrackerService,
        params: &ListParams,
    ) -> ServiceResult<PaginatedEnvelope<TaskResource>> {
        service.list_tasks(params).await
    }

    async fn fetch_one(service: &dyn TrackerService, id: i64) -> ServiceResult<TaskResource> {
        service.get_task(id).await
    }

    async fn create(service: &dyn TrackerService, form: &TaskForm) -> ServiceResult<TaskResource> {
        service.create_task(form).await
    }

    async fn update(
        service: &dyn TrackerService,
        id: i64,
        form: &TaskForm,
    ) -> ServiceResult<TaskResource> {
        service.update_task(id, form).await
    }

    async fn delete(service: &dyn TrackerService, id: i64) -> ServiceResult<()> {
        service.delete_task(id).await
    }
}

/// Shared handle to one entity's state and the service that feeds it.
///
/// Cloning is cheap; clones share the same state.
pub struct SliceHandle<E: Entity> {
    state: Arc<Mutex<SliceState<E>>>,
    service: Arc<dyn TrackerService>,
}

impl<E: Entity> Clone for SliceHandle<E> {
    fn clone(&self) -> Self {
        Self { state: Arc::clone(&self.state), service: Arc::clone(&self.service) }
    }
}

/// Handle for the projects slice.
pub type ProjectsSlice = SliceHandle<Projects>;

/// Handle for the tasks slice.
pub type TasksSlice = SliceHandle<Tasks>;

impl<E: RemoteEntity> SliceHandle<E> {
    /// Create a handle with empty state.
    #[must_use]
    pub fn new(service: Arc<dyn TrackerService>) -> Self {
        Self { state: Arc::new(Mutex::new(SliceState::default())), service }
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SliceState<E> {
        self.lock().clone()
    }

    /// Apply a synchronous action.
    pub fn dispatch(&self, action: Action<E>) {
        let mut guard = self.lock();
        let state = std::mem::take(&mut *guard);
        *guard = reduce(state, action);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SliceState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the next list sequence number and mark the list loading.
    fn begin_list(&self) -> u64 {
        let mut guard = self.lock();
        let seq = guard.list_seq + 1;
        let state = std::mem::take(&mut *guard);
        *guard = reduce(state, Action::ListPending { seq });
        seq
    }

    /// Load one list page. A response that arrives after a newer list
    /// request has started is dropped.
    pub async fn fetch_list(&self, params: ListParams) {
        let seq = self.begin_list();
        match E::fetch_list(self.service.as_ref(), &params).await {
            Ok(page) => self.dispatch(Action::ListFulfilled { seq, page }),
            Err(error) => {
                tracing::debug!(seq, error = error.message(), "list request failed");
                self.dispatch(Action::ListRejected { seq, error });
            }
        }
    }

    /// Load a record into the detail view.
    ///
    /// # Errors
    ///
    /// Returns the service error, which is also recorded in the state.
    pub async fn fetch_one(&self, id: i64) -> ServiceResult<E::Detail> {
        self.dispatch(Action::ShowPending);
        match E::fetch_one(self.service.as_ref(), id).await {
            Ok(detail) => {
                self.dispatch(Action::ShowFulfilled(detail.clone()));
                Ok(detail)
            }
            Err(error) => {
                self.dispatch(Action::ShowRejected(error.clone()));
                Err(error)
            }
        }
    }

    /// Create a record from `form`.
    ///
    /// # Errors
    ///
    /// Returns the service error; field errors land in `form_errors`.
    pub async fn create(&self, form: E::Form) -> ServiceResult<E::Item> {
        self.dispatch(Action::CreatePending);
        match E::create(self.service.as_ref(), &form).await {
            Ok(item) => {
                self.dispatch(Action::CreateFulfilled(item.clone()));
                Ok(item)
            }
            Err(error) => {
                self.dispatch(Action::CreateRejected(error.clone()));
                Err(error)
            }
        }
    }

    /// Update record `id` from `form`.
    ///
    /// # Errors
    ///
    /// Returns the service error; field errors land in `form_errors`.
    pub async fn update(&self, id: i64, form: E::Form) -> ServiceResult<E::Item> {
        self.dispatch(Action::UpdatePending);
        match E::update(self.service.as_ref(), id, &form).await {
            Ok(item) => {
                self.dispatch(Action::UpdateFulfilled(item.clone()));
                Ok(item)
            }
            Err(error) => {
                self.dispatch(Action::UpdateRejected(error.clone()));
                Err(error)
            }
        }
    }

    /// Delete record `id`.
    ///
    /// # Errors
    ///
    /// Returns the service error, which is also recorded in the state.
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.dispatch(Action::DeletePending);
        match E::delete(self.service.as_ref(), id).await {
            Ok(()) => {
                self.dispatch(Action::DeleteFulfilled(id));
                Ok(())
            }
            Err(error) => {
                self.dispatch(Action::DeleteRejected(error.clone()));
                Err(error)
            }
        }
    }
}
