use std::path::Path;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::errors::ApiError;
use crate::state::AppState;

pub mod config;
pub mod health;
pub mod metrics;

pub(crate) const NO_STORE: &str = "no-store";
pub(crate) const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// Serialize `body` as JSON with an explicit content type and cache policy.
pub(crate) fn json_response<T: Serialize>(
    status: StatusCode,
    content_type: &'static str,
    cache_control: &'static str,
    body: &T,
) -> Result<Response, ApiError> {
    let bytes = serde_json::to_vec(body)?;
    Ok((
        status,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CACHE_CONTROL, HeaderValue::from_static(cache_control)),
        ],
        bytes,
    )
        .into_response())
}

/// Build the application router. Unmatched paths fall through to the static
/// assets in `assets_dir` when one is given.
pub fn build_router(state: AppState, cors: CorsLayer, assets_dir: Option<&str>) -> Router {
    let ops = Router::new()
        .route("/live", get(health::live))
        .route("/ready", get(health::ready))
        .route("/api/config", get(config::runtime_config))
        .route("/metrics", get(metrics::metrics))
        .with_state(state);

    let app = match assets_dir {
        Some(dir) => {
            let index = Path::new(dir).join("index.html");
            ops.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        }
        None => ops,
    };

    app.layer(cors).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
            .on_request(DefaultOnRequest::new().level(Level::DEBUG))
            .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
            .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
    )
}
