//! Client for the tracker API.
//!
//! [`service`] performs the HTTP calls, [`state`] holds per-entity list and
//! detail state with a pure reducer, [`actions`] ties the two together, and
//! [`ui`] models the list screens on top.
//!
//! ```no_run
//! use std::sync::Arc;
//! use project_tracker::client::{HttpTrackerService, TasksSlice};
//!
//! # async fn demo() {
//! let service = Arc::new(HttpTrackerService::new("http://localhost:8000/api"));
//! let tasks = TasksSlice::new(service);
//! tasks.fetch_list(Default::default()).await;
//! println!("{} tasks", tasks.snapshot().pagination.total);
//! # }
//! ```

pub mod actions;
pub mod service;
pub mod state;
pub mod ui;

pub use actions::{ProjectsSlice, RemoteEntity, SliceHandle, TasksSlice};
pub use service::{
    HttpTrackerService, ProjectForm, ServiceError, ServiceResult, TaskForm, TrackerService,
};
pub use state::{
    reduce, Action, Entity, Pagination, ProjectFilterChange, ProjectFilters, ProjectFormChange,
    Projects, SliceState, TaskFilterChange, TaskFilters, TaskFormChange, Tasks,
};
