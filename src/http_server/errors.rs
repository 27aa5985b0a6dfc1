//! # HTTP API Errors
//!
//! Maps domain failures onto status codes:
//!
//! - validation failures and malformed bodies -> 400
//! - unknown records -> 404
//! - oversized uploads -> 413
//! - everything else -> 500

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::export::PipelineError;
use crate::resource::RepositoryError;
use crate::store::StoreError;
use crate::upload::UploadError;
use crate::validation::Violation;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by HTTP handlers
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Validation errors in request body!")]
    ValidationFailed(Vec<Violation>),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upload(err) => {
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::ValidationFailed { errors } => ApiError::ValidationFailed(errors),
            not_found @ RepositoryError::NotFound { .. } => ApiError::NotFound(not_found.to_string()),
            RepositoryError::Store(store) => ApiError::Store(store),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(rename = "errorsList", skip_serializing_if = "Vec::is_empty")]
    pub errors_list: Vec<Violation>,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        let code = err.status_code().as_u16();
        let error = err.to_string();
        let errors_list = match err {
            ApiError::ValidationFailed(errors) => errors,
            _ => Vec::new(),
        };
        Self {
            error,
            code,
            errors_list,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        }
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}
