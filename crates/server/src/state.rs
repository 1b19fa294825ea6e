use std::sync::Arc;

use common::{EnvSource, ProcessEnv};
use reqwest::Client;

/// Shared by every handler. Environment is read per request through `env`.
#[derive(Clone)]
pub struct AppState {
    pub http: Client,
    pub env: Arc<dyn EnvSource>,
    pub default_ready_timeout_ms: u64,
}

impl AppState {
    pub fn new(http: Client, default_ready_timeout_ms: u64) -> Self {
        Self { http, env: Arc::new(ProcessEnv), default_ready_timeout_ms }
    }

    pub fn with_env(mut self, env: Arc<dyn EnvSource>) -> Self {
        self.env = env;
        self
    }
}
