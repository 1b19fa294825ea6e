//! Environment/runtime helpers
//!
//! Values are looked up through [`EnvSource`] so handlers can read the live
//! process environment while tests inject a fixed map.

use std::collections::HashMap;

use tracing::warn;

/// Read-only view over environment variables.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;

    /// Trimmed value of `key`; blank values count as unset.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// First non-empty value among `keys`, in order.
    fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.non_empty(k))
    }
}

/// The real process environment, read on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of variables.
#[derive(Debug, Clone, Default)]
pub struct MapEnv(HashMap<String, String>);

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

/// Warn when the static assets directory is missing; the server still starts.
pub async fn ensure_env(assets_dir: &str) -> anyhow::Result<()> {
    match tokio::fs::metadata(assets_dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(anyhow::anyhow!("{assets_dir} exists but is not a directory")),
        Err(_) => {
            warn!(%assets_dir, "static assets directory not found; UI routes will 404");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_fall_through() {
        let env = MapEnv::new()
            .with("AUTH_SERVICE", "   ")
            .with("PUBLIC_AUTH_SERVICE", " http://auth:8001 ");
        assert_eq!(
            env.first_of(&["AUTH_SERVICE", "PUBLIC_AUTH_SERVICE"]).as_deref(),
            Some("http://auth:8001")
        );
        assert_eq!(env.first_of(&["ORDER_SERVICE"]), None);
    }

    #[test]
    fn primary_key_wins() {
        let env: MapEnv = [("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(env.first_of(&["A", "B"]).as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn missing_assets_dir_is_not_fatal() {
        assert!(ensure_env("/definitely/not/here").await.is_ok());
    }
}
