//! JSON API over HTTP.
//!
//! Routes live under `/api`:
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `/projects` | 200, paginated, with `tasks_count` |
//! | POST | `/projects` | 201 |
//! | GET | `/projects/{id}` | 200, with `tasks` |
//! | PUT, PATCH | `/projects/{id}` | 200 |
//! | DELETE | `/projects/{id}` | 200, cascades to tasks |
//! | GET | `/tasks` | 200, paginated, with `project` |
//! | POST | `/tasks` | 201 |
//! | GET | `/tasks/{id}` | 200, with `project` |
//! | PUT, PATCH | `/tasks/{id}` | 200 |
//! | DELETE | `/tasks/{id}` | 200 |
//! | GET | `/health` | 200 |

pub mod error;
pub mod handlers;
pub mod validation;

pub use error::ApiErrorResponse;
pub use handlers::{AppState, HealthResponse};

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::Result;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let api = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/projects", get(handlers::list_projects).post(handlers::create_project))
        .route(
            "/projects/{id}",
            get(handlers::show_project)
                .put(handlers::update_project)
                .patch(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route("/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route(
            "/tasks/{id}",
            get(handlers::show_task)
                .put(handlers::update_task)
                .patch(handlers::update_task)
                .delete(handlers::delete_task),
        );

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the API on `listener` until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the server fails.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    axum::serve(listener, router(state)).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Completes when a shutdown signal arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, initiating graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
