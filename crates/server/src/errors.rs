use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

/// Handler failure rendered as `{"error": ...}`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into() }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::internal(format!("response encoding failed: {e}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "request failed");
        }
        (self.status, Json(serde_json::json!({"error": self.message}))).into_response()
    }
}

/// Reasons the frontend refuses to start.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Config file unreadable, malformed or out of range. `{0:#}` keeps the cause chain.
    #[error("frontend config rejected: {0:#}")]
    InvalidConfig(anyhow::Error),
    #[error("static assets directory {dir:?} unusable: {reason}")]
    Assets { dir: String, reason: String },
    #[error("backend HTTP client could not be built: {0}")]
    HttpClient(#[source] service::errors::ServiceError),
}
