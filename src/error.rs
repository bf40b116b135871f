use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::config::ConfigError;
use crate::hiring::repository::RepositoryError;
use crate::telemetry::TelemetryError;

/// Request-scoped error surfaced to API clients.
///
/// Validation failures carry per-field messages and render as
/// `{"error": ..., "fields": {...}}`; everything else renders as `{"error"}`
/// with the matching status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation { fields: BTreeMap<String, String> },
    #[error("Authentication required")]
    Unauthorized,
    #[error("Insufficient permissions")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// Single-field validation failure, the common case for upload errors.
    pub fn field(name: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(name.into(), message.into());
        Self::Validation { fields }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let ApiError::Internal(detail) = &self {
            tracing::error!(%detail, "request failed");
        }

        let body = match &self {
            ApiError::Validation { fields } => Json(json!({
                "error": self.to_string(),
                "fields": fields,
            })),
            // Internal details stay in the logs, not the response.
            _ => Json(json!({ "error": self.to_string() })),
        };

        (status, body).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict => ApiError::Conflict("record already exists".to_string()),
            RepositoryError::NotFound => ApiError::NotFound("record"),
            RepositoryError::Unavailable(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(value: std::io::Error) -> Self {
        ApiError::Internal(value.to_string())
    }
}

/// Process-level error for startup and CLI paths.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
}
