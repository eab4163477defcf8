use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::job::RegistryError;
use crate::library::LibraryError;
use crate::pipeline::PipelineError;
use crate::url_model::UrlRejected;

/// Handler error, rendered as `{"detail": "..."}` with a matching status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    /// Adapter-side failure of an archive request.
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn job_not_found() -> Self {
        ApiError::NotFound("Job not found".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NotFound(_) => ApiError::job_not_found(),
            RegistryError::NotActive(_) => ApiError::BadRequest("Job is not active".to_string()),
            RegistryError::Conflict(_) => {
                ApiError::Conflict("Cannot delete active job".to_string())
            }
            RegistryError::AlreadyClaimed(_) => {
                ApiError::Conflict("Archive already requested for this job".to_string())
            }
            RegistryError::InvalidTransition { .. } => ApiError::Conflict(e.to_string()),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Registry(RegistryError::NotActive(_)) => {
                ApiError::Conflict("Job is no longer active".to_string())
            }
            PipelineError::Registry(e) => e.into(),
            PipelineError::Failed(message) => ApiError::Unprocessable(message),
            PipelineError::Cancelled(_) => ApiError::Conflict("Job was cancelled".to_string()),
        }
    }
}

impl From<UrlRejected> for ApiError {
    fn from(e: UrlRejected) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<LibraryError> for ApiError {
    fn from(e: LibraryError) -> Self {
        match e {
            LibraryError::NotFound => ApiError::NotFound("Download not found".to_string()),
            LibraryError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
