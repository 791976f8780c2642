//! # API Errors
//!
//! Maps core failures onto HTTP status codes and `{"detail": ...}` bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;
use taskmanager_core::{DbError, RepoError, ValidationError};
use thiserror::Error;

/// Result type for request handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Request handling errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or mistyped input, detected before any storage call
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No task with the requested id
    #[error("Task not found")]
    NotFound,

    /// Route does not exist
    #[error("Not Found")]
    RouteNotFound,

    /// Route exists but not for this method
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// Storage failure (connection loss, constraint violation, bad row)
    #[error("storage failure: {0}")]
    Storage(String),

    /// Blocking worker failed to complete
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(_) => ApiError::NotFound,
            other => ApiError::Storage(other.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Validation(err) => json!({ "detail": err.errors }),
            ApiError::NotFound | ApiError::RouteNotFound | ApiError::MethodNotAllowed => {
                json!({ "detail": self.to_string() })
            }
            ApiError::Storage(_) | ApiError::Internal(_) => {
                error!(
                    "event=request_failed module=server status=error error={}",
                    self
                );
                json!({ "detail": "Internal Server Error" })
            }
        };
        (status, Json(body)).into_response()
    }
}
