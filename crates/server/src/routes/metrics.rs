use axum::{http::header, response::IntoResponse};

use crate::errors::ApiError;
use crate::observability::encode_metrics;

pub async fn metrics() -> Result<impl IntoResponse, ApiError> {
    let body = encode_metrics()?;
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}
