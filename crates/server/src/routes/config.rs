use axum::{extract::State, http::StatusCode, response::Response};
use service::runtime_config::RuntimeConfig;

use super::{json_response, NO_CACHE};
use crate::errors::ApiError;
use crate::state::AppState;

/// Backend base URLs for the browser, resolved from the environment on each request.
pub async fn runtime_config(State(state): State<AppState>) -> Result<Response, ApiError> {
    let config = RuntimeConfig::from_env(state.env.as_ref());
    json_response(StatusCode::OK, "application/json", NO_CACHE, &config)
}
