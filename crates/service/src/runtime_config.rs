//! Runtime configuration: backend base URLs resolved at request time.
//!
//! The server side builds a [`RuntimeConfig`] from the environment on every
//! call. Clients fetch it once through a [`RuntimeConfigCache`].

use std::sync::Arc;

use async_trait::async_trait;
use common::{join_url, EnvSource};
use moka::future::Cache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ServiceError;

pub const DEFAULT_AUTH_SERVICE: &str = "http://localhost:8001";
pub const DEFAULT_PRODUCT_SERVICE: &str = "http://localhost:8002";
pub const DEFAULT_ORDER_SERVICE: &str = "http://localhost:8003";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(rename = "AUTH_SERVICE")]
    pub auth_service: String,
    #[serde(rename = "PRODUCT_SERVICE")]
    pub product_service: String,
    #[serde(rename = "ORDER_SERVICE")]
    pub order_service: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            auth_service: DEFAULT_AUTH_SERVICE.into(),
            product_service: DEFAULT_PRODUCT_SERVICE.into(),
            order_service: DEFAULT_ORDER_SERVICE.into(),
        }
    }
}

impl RuntimeConfig {
    /// `<KEY>`, then `PUBLIC_<KEY>`, then the localhost default.
    pub fn from_env(env: &dyn EnvSource) -> Self {
        Self {
            auth_service: resolve(env, &["AUTH_SERVICE", "PUBLIC_AUTH_SERVICE"], DEFAULT_AUTH_SERVICE),
            product_service: resolve(env, &["PRODUCT_SERVICE", "PUBLIC_PRODUCT_SERVICE"], DEFAULT_PRODUCT_SERVICE),
            order_service: resolve(env, &["ORDER_SERVICE", "PUBLIC_ORDER_SERVICE"], DEFAULT_ORDER_SERVICE),
        }
    }
}

fn resolve(env: &dyn EnvSource, keys: &[&str], default: &str) -> String {
    env.first_of(keys).unwrap_or_else(|| default.to_string())
}

/// Where a client obtains its [`RuntimeConfig`].
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn fetch(&self) -> Result<RuntimeConfig, ServiceError>;
}

/// Fetches `GET <frontend>/api/config`.
#[derive(Debug, Clone)]
pub struct HttpConfigSource {
    client: Client,
    url: String,
}

impl HttpConfigSource {
    pub fn new(client: Client, frontend_base: &str) -> Self {
        Self { client, url: join_url(frontend_base, "/api/config") }
    }
}

#[async_trait]
impl ConfigSource for HttpConfigSource {
    async fn fetch(&self) -> Result<RuntimeConfig, ServiceError> {
        debug!(url = %self.url, "fetching runtime config");
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::RuntimeConfig(format!("{} returned {status}", self.url)));
        }
        Ok(resp.json::<RuntimeConfig>().await?)
    }
}

/// Process-wide cache of the runtime config.
///
/// The first successful fetch is reused. Concurrent callers during the first
/// fetch wait on the same in-flight request. Failures are not cached.
#[derive(Clone)]
pub struct RuntimeConfigCache {
    source: Arc<dyn ConfigSource>,
    cache: Cache<(), RuntimeConfig>,
}

impl RuntimeConfigCache {
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self { source, cache: Cache::new(1) }
    }

    pub async fn get(&self) -> Result<RuntimeConfig, ServiceError> {
        let source = Arc::clone(&self.source);
        self.cache
            .try_get_with((), async move {
                let cfg = source.fetch().await?;
                info!(auth = %cfg.auth_service, product = %cfg.product_service, order = %cfg.order_service, "runtime config loaded");
                Ok::<_, ServiceError>(cfg)
            })
            .await
            .map_err(|e| ServiceError::RuntimeConfig(e.to_string()))
    }

    /// Drop the cached value so the next [`get`](Self::get) fetches again.
    pub async fn invalidate(&self) {
        self.cache.invalidate(&()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::MapEnv;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingSource {
        calls: AtomicUsize,
        fail_first: bool,
    }

    #[async_trait]
    impl ConfigSource for CountingSource {
        async fn fetch(&self) -> Result<RuntimeConfig, ServiceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            if self.fail_first && n == 0 {
                return Err(ServiceError::RuntimeConfig("boom".into()));
            }
            Ok(RuntimeConfig::default())
        }
    }

    #[test]
    fn env_resolution_with_fallbacks() {
        let env = MapEnv::new()
            .with("AUTH_SERVICE", "http://auth:9001")
            .with("PUBLIC_AUTH_SERVICE", "http://ignored")
            .with("PUBLIC_ORDER_SERVICE", "http://order:9003");
        let cfg = RuntimeConfig::from_env(&env);
        assert_eq!(cfg.auth_service, "http://auth:9001");
        assert_eq!(cfg.product_service, DEFAULT_PRODUCT_SERVICE);
        assert_eq!(cfg.order_service, "http://order:9003");
    }

    #[test]
    fn serializes_upper_case_keys() {
        let json = serde_json::to_value(RuntimeConfig::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "AUTH_SERVICE": "http://localhost:8001",
                "PRODUCT_SERVICE": "http://localhost:8002",
                "ORDER_SERVICE": "http://localhost:8003",
            })
        );
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let source = Arc::new(CountingSource { calls: AtomicUsize::new(0), fail_first: false });
        let cache = RuntimeConfigCache::new(source.clone());

        let results = futures::future::join_all((0..8).map(|_| cache.get())).await;
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        cache.get().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        cache.invalidate().await;
        cache.get().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let source = Arc::new(CountingSource { calls: AtomicUsize::new(0), fail_first: true });
        let cache = RuntimeConfigCache::new(source.clone());

        assert!(cache.get().await.is_err());
        assert_eq!(cache.get().await.unwrap(), RuntimeConfig::default());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
