use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

/// Readiness probe timeout used when neither config nor `READY_TIMEOUT_MS` sets one.
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 1500;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub readiness: ReadinessConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 3000, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadinessConfig {
    #[serde(default = "default_ready_timeout")]
    pub timeout_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self { timeout_ms: DEFAULT_READY_TIMEOUT_MS }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_assets_dir")]
    pub dir: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self { dir: default_assets_dir() }
    }
}

fn default_ready_timeout() -> u64 { DEFAULT_READY_TIMEOUT_MS }
fn default_assets_dir() -> String { "dist".to_string() }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

/// `Ok(None)` when `path` does not exist; read and parse errors are returned.
pub fn load_optional(path: &str) -> Result<Option<AppConfig>> {
    match std::fs::read_to_string(path) {
        Ok(content) => load_from_str(&content)
            .map(Some)
            .with_context(|| format!("parsing {path}")),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow!(e).context(format!("reading {path}"))),
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Config file at `CONFIG_PATH` if present, otherwise `SERVER_HOST`/`SERVER_PORT`
    /// over defaults. A file that exists but does not parse is an error.
    pub fn load_or_env() -> Result<Self> {
        Self::load_or_env_from(&config_path())
    }

    pub fn load_or_env_from(path: &str) -> Result<Self> {
        let mut cfg = match load_optional(path)? {
            Some(cfg) => cfg,
            None => {
                let mut cfg = AppConfig::default();
                if let Ok(host) = std::env::var("SERVER_HOST") {
                    cfg.server.host = host;
                }
                if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
                    cfg.server.port = port;
                }
                cfg
            }
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.readiness.validate()?;
        if self.assets.dir.trim().is_empty() {
            self.assets.dir = default_assets_dir();
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.server.host, self.server.port).parse()?)
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads.map_or(true, |w| w == 0) {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl ReadinessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(anyhow!("readiness.timeout_ms must be a positive number of milliseconds"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let mut cfg = load_from_str("").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.readiness.timeout_ms, DEFAULT_READY_TIMEOUT_MS);
        assert_eq!(cfg.assets.dir, "dist");
        assert_eq!(cfg.bind_addr().unwrap().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn sections_override_defaults() {
        let mut cfg = load_from_str(
            r#"
            [server]
            host = ""
            port = 8080
            worker_threads = 0

            [readiness]
            timeout_ms = 250

            [assets]
            dir = "public"
            "#,
        )
        .unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.readiness.timeout(), Duration::from_millis(250));
        assert_eq!(cfg.assets.dir, "public");
    }

    #[test]
    fn rejects_zero_port_and_timeout() {
        let mut cfg = load_from_str("[server]\nhost = \"0.0.0.0\"\nport = 0\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = load_from_str("[readiness]\ntimeout_ms = 0\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn loads_from_file() {
        let path = std::env::temp_dir().join(format!("frontend_config_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server]\nhost = \"0.0.0.0\"\nport = 4321\n").unwrap();
        let cfg = load_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 4321);
        let _ = std::fs::remove_file(&path);
    }

    fn temp_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("frontend_config_{}.toml", uuid::Uuid::new_v4()))
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = temp_path();
        assert!(load_optional(path.to_str().unwrap()).unwrap().is_none());
        let cfg = AppConfig::load_or_env_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.readiness.timeout_ms, DEFAULT_READY_TIMEOUT_MS);
        assert_eq!(cfg.assets.dir, "dist");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_path();
        std::fs::write(&path, "[server\nport = \"x\"\n").unwrap();
        let err = AppConfig::load_or_env_from(path.to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn invalid_values_in_file_are_an_error() {
        let path = temp_path();
        std::fs::write(&path, "[readiness]\ntimeout_ms = 0\n").unwrap();
        assert!(AppConfig::load_or_env_from(path.to_str().unwrap()).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
