//! HTTP error responses.
//!
//! Every failure leaves a handler as an [`ApiErrorResponse`]. Validation
//! failures keep their per-field messages, a missing record becomes a short
//! not-found message, and anything else is logged and reported as a generic
//! server error without details.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{Error, ValidationErrors};
use crate::resources::ErrorResponse;

/// An HTTP status plus the JSON error body.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error body.
    pub body: ErrorResponse,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub const fn new(status: StatusCode, body: ErrorResponse) -> Self {
        Self { status, body }
    }

    /// Creates a 400 Bad Request response.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorResponse::message(message))
    }

    /// Creates a 422 Unprocessable Entity response.
    #[must_use]
    pub fn validation(errors: ValidationErrors) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, ErrorResponse::validation(errors))
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ErrorResponse::message(message))
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::message("Server Error"))
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<Error> for ApiErrorResponse {
    fn from(error: Error) -> Self {
        match error {
            Error::Validation(errors) => Self::validation(errors),
            Error::NotFound { entity, id } => {
                tracing::debug!(%entity, id, "record not found");
                Self::not_found(format!("{entity} not found."))
            }
            Error::Io(_)
            | Error::Json(_)
            | Error::Yaml(_)
            | Error::Database(_)
            | Error::Config(_) => {
                tracing::error!(%error, "request failed");
                Self::internal_error()
            }
        }
    }
}

impl From<ValidationErrors> for ApiErrorResponse {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation(errors)
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(%rejection, "rejected request body");
        Self::bad_request(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiErrorResponse {
    fn from(error: tokio::task::JoinError) -> Self {
        tracing::error!(%error, "blocking store task failed");
        Self::internal_error()
    }
}
