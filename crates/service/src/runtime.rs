//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binaries can import startup checks
//! from the service layer alongside the shared HTTP client.

use std::time::Duration;

use reqwest::Client;

use crate::errors::ServiceError;

/// Verify the static assets directory; a missing one only warns.
pub async fn ensure_env(assets_dir: &str) -> anyhow::Result<()> {
    common::env::ensure_env(assets_dir).await
}

/// Shared outbound client. Per-request deadlines are applied by callers.
pub fn http_client() -> Result<Client, ServiceError> {
    Ok(Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .pool_idle_timeout(Duration::from_secs(30))
        .user_agent(concat!("marketplace-frontend/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
