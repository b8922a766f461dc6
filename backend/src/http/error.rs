//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::services::RegistryError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (bad day, group or body)
    BadRequest(String),
    /// Assignment rejected by the registry
    Registry(RegistryError),
    /// Store failure
    Repository(RepositoryError),
}

fn repository_response(e: &RepositoryError) -> (StatusCode, ApiError) {
    let context = e.context().to_string();
    let (status, code) = match e {
        RepositoryError::ConfigurationError { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE")
        }
        _ => (StatusCode::BAD_GATEWAY, "STORE_ERROR"),
    };
    (status, ApiError::new(code, e.to_string()).with_details(context))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg)),
            AppError::Registry(RegistryError::Conflict { worker_id, held_by }) => (
                StatusCode::CONFLICT,
                ApiError::new(
                    "CONFLICT",
                    RegistryError::Conflict { worker_id, held_by }.to_string(),
                )
                .with_details(format!("held_by={}", held_by)),
            ),
            AppError::Registry(RegistryError::NoSelection) => (
                StatusCode::CONFLICT,
                ApiError::new("NO_SELECTION", RegistryError::NoSelection.to_string()),
            ),
            AppError::Registry(RegistryError::Store(e)) | AppError::Repository(e) => {
                repository_response(&e)
            }
        };

        if status.is_server_error() {
            tracing::error!(code = %error.code, "{}", error.message);
        }

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        AppError::Registry(err)
    }
}
