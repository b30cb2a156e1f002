//! # API Error Types
//!
//! Maps the workflow error taxonomy and store errors onto HTTP responses.
//! Every taxonomy member keeps its own machine-readable code, so a denied
//! transition is distinguishable from a missing entity and from a
//! concurrency loss. Internal errors are logged and redacted — backend
//! details never reach a client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use gigbay_core::WorkflowError;
use gigbay_store::StoreError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. `"INVALID_STATE"`).
    pub code: String,
    /// Human-readable message naming the violated rule.
    pub message: String,
}

/// Application-level error implementing [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Referenced entity does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or invalid credentials (401).
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Authenticated, but the operation is not theirs to perform (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The operation is illegal from the entity's current status (409).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A uniqueness invariant or concurrent writer rejected the write (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Request input failed business validation (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal failure (500). Logged, never returned verbatim.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The HTTP status and machine-readable code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::InvalidState(_) => (StatusCode::CONFLICT, "INVALID_STATE"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match &err {
            WorkflowError::NotFound { .. } => Self::NotFound(err.to_string()),
            WorkflowError::Unauthorized { .. } => Self::Forbidden(err.to_string()),
            WorkflowError::InvalidState { .. } => Self::InvalidState(err.to_string()),
            WorkflowError::Validation(_) => Self::Validation(err.to_string()),
            WorkflowError::Conflict(_) => Self::Conflict(err.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            StoreError::VersionConflict { .. } => Self::Conflict(format!(
                "{err}; the entity changed while the request was in flight — retry"
            )),
            StoreError::UniqueViolation(_) => Self::Conflict(err.to_string()),
            StoreError::Backend(_) => Self::Internal(err.to_string()),
        }
    }
}
