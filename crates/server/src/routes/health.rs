use axum::{extract::State, http::StatusCode, response::Response};
use common::types::LiveResponse;
use service::readiness;

use super::{json_response, NO_STORE};
use crate::errors::ApiError;
use crate::observability;
use crate::state::AppState;

const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Liveness: the process is up. Always 200.
pub async fn live() -> Result<Response, ApiError> {
    json_response(StatusCode::OK, JSON_UTF8, NO_STORE, &LiveResponse::frontend())
}

/// Readiness: probe every backend and report 200 only if all are ready.
pub async fn ready(State(state): State<AppState>) -> Result<Response, ApiError> {
    let report = readiness::check_env(&state.http, state.env.as_ref(), state.default_ready_timeout_ms).await;
    observability::record_report(&report);
    json_response(report.http_status(), JSON_UTF8, NO_STORE, &report)
}
