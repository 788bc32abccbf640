//! Client against a live server on an ephemeral port.

use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;

use project_tracker::api::{router, AppState};
use project_tracker::client::ui::ListController;
use project_tracker::client::{
    HttpTrackerService, ProjectForm, ProjectsSlice, ServiceError, TaskFilterChange, TaskForm,
    TasksSlice, TrackerService,
};
use project_tracker::config::ServerConfig;
use project_tracker::tracker::{SqliteTrackerStore, Status};

struct LiveServer {
    _dir: TempDir,
    service: Arc<HttpTrackerService>,
    server: tokio::task::JoinHandle<()>,
}

impl LiveServer {
    async fn start() -> Self {
        let dir = TempDir::new().unwrap();
        let store = SqliteTrackerStore::new(dir.path().join("client.db")).unwrap();
        let state = AppState::new(Arc::new(store), ServerConfig::default());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        let service = Arc::new(HttpTrackerService::new(format!("http://{address}/api")));
        Self { _dir: dir, service, server }
    }

    fn service(&self) -> Arc<dyn TrackerService> {
        Arc::clone(&self.service) as Arc<dyn TrackerService>
    }
}

impl Drop for LiveServer {
    fn drop(&mut self) {
        self.server.abort();
    }
}

#[tokio::test]
async fn test_project_slice_round_trip() {
    let server = LiveServer::start().await;
    let projects = ProjectsSlice::new(server.service());

    let created = projects.create(ProjectForm { name: "Website".into() }).await.unwrap();
    assert_eq!(projects.snapshot().list.len(), 1);

    let detail = projects.fetch_one(created.id).await.unwrap();
    assert_eq!(detail.name, "Website");
    assert!(detail.tasks.is_empty());

    projects.update(created.id, ProjectForm { name: "Website v2".into() }).await.unwrap();
    let state = projects.snapshot();
    assert_eq!(state.list[0].name, "Website v2");
    assert_eq!(state.current_item.map(|p| p.name).as_deref(), Some("Website v2"));

    projects.delete(created.id).await.unwrap();
    assert!(projects.snapshot().list.is_empty());
    assert!(matches!(
        projects.fetch_one(created.id).await,
        Err(ServiceError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_validation_errors_reach_form_state() {
    let server = LiveServer::start().await;
    let tasks = TasksSlice::new(server.service());

    let error = tasks.create(TaskForm::default()).await.unwrap_err();
    let errors = match error {
        ServiceError::Validation { errors, .. } => errors,
        other => panic!("expected validation error, got {other:?}"),
    };
    assert!(errors.contains("title"));
    assert!(errors.contains("project_id"));

    let state = tasks.snapshot();
    assert!(state.form_errors.contains("title"));
    assert!(state.error.is_some());
}

#[tokio::test]
async fn test_task_list_controller_filters() {
    let server = LiveServer::start().await;
    let service = server.service();
    let project = service.create_project(&ProjectForm { name: "Docs".into() }).await.unwrap();
    for (title, status) in [("Write intro", Status::Pending), ("Write guide", Status::Completed)] {
        let form = TaskForm { title: title.into(), status, project_id: Some(project.id) };
        service.create_task(&form).await.unwrap();
    }

    let mut list = ListController::new(TasksSlice::new(service)).with_per_page(1);
    list.refresh().await;
    let state = list.slice().snapshot();
    assert_eq!(state.pagination.total, 2);
    assert_eq!(state.pagination.last_page, 2);
    assert_eq!(state.list[0].project.as_ref().map(|p| p.name.as_str()), Some("Docs"));

    list.on_filter_change(TaskFilterChange::Status(Some(Status::Completed)));
    list.refresh().await;
    let state = list.slice().snapshot();
    assert_eq!(state.pagination.total, 1);
    assert_eq!(state.list[0].title, "Write guide");

    list.on_page_change(5);
    list.refresh().await;
    assert!(list.slice().snapshot().list.is_empty());
}
