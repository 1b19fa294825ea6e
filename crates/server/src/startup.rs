use std::future::Future;

use axum::Router;
use configs::AppConfig;
use service::runtime;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load `config.toml` (or env fallbacks) and validate it.
pub fn load_config() -> Result<AppConfig, StartupError> {
    AppConfig::load_or_env().map_err(StartupError::InvalidConfig)
}

/// Same as [`load_config`] for an explicit file.
pub fn load_config_from(path: &str) -> Result<AppConfig, StartupError> {
    AppConfig::load_or_env_from(path).map_err(StartupError::InvalidConfig)
}

/// Build the full application from config.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    runtime::ensure_env(&cfg.assets.dir)
        .await
        .map_err(|e| StartupError::Assets { dir: cfg.assets.dir.clone(), reason: e.to_string() })?;
    let http = runtime::http_client().map_err(StartupError::HttpClient)?;
    let state = AppState::new(http, cfg.readiness.timeout_ms);
    Ok(routes::build_router(state, build_cors(), Some(&cfg.assets.dir)))
}

/// Public entry: build the app and serve until `shutdown` resolves.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(&cfg).await?;
    let addr = cfg.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        assets_dir = %cfg.assets.dir,
        ready_timeout_ms = cfg.readiness.timeout_ms,
        "frontend listening"
    );
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("frontend server stopped");
    Ok(())
}
