//! Readiness aggregation over the backend services.
//!
//! Every dependency gets one `GET <base>/ready`, all of them concurrently and
//! each bounded by the same timeout. Probe failures are recorded in the
//! [`CheckResult`] and never returned as errors.

use std::time::{Duration, Instant};

use common::{join_url, types::HealthStatus, types::SERVICE_NAME, EnvSource};
use futures::future::join_all;
use reqwest::{header::ACCEPT, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Variable holding the per-probe timeout in milliseconds.
pub const READY_TIMEOUT_ENV: &str = "READY_TIMEOUT_MS";

/// Dependencies that must always be probed, with their env keys in lookup order.
const REQUIRED: [(&str, [&str; 2]); 3] = [
    ("auth-service", ["AUTH_SERVICE", "PUBLIC_AUTH_SERVICE"]),
    ("product-service", ["PRODUCT_SERVICE", "PUBLIC_PRODUCT_SERVICE"]),
    ("order-service", ["ORDER_SERVICE", "PUBLIC_ORDER_SERVICE"]),
];

/// Probed only when one of its keys is set.
const OPTIONAL: [(&str, [&str; 2]); 1] = [("email-service", ["EMAIL_SERVICE", "PUBLIC_EMAIL_SERVICE"])];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub base_url: Option<String>,
}

impl Dependency {
    pub fn new(name: impl Into<String>, base_url: Option<String>) -> Self {
        Self { name: name.into(), base_url }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub url: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    fn missing_config(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: String::new(),
            ok: false,
            status: None,
            latency_ms: None,
            error: Some(format!("Missing env var for {name} base URL")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub status: HealthStatus,
    pub service: String,
    pub timeout_ms: u64,
    pub checks: Vec<CheckResult>,
}

impl ReadinessReport {
    pub fn is_ok(&self) -> bool {
        self.status == HealthStatus::Ok
    }

    /// 200 when every dependency is ready, 503 otherwise.
    pub fn http_status(&self) -> StatusCode {
        if self.is_ok() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Resolve the probe set from the environment. Required dependencies come
/// first in a fixed order; a missing URL is kept so it reports as a failed check.
pub fn resolve_dependencies(env: &dyn EnvSource) -> Vec<Dependency> {
    let mut deps: Vec<Dependency> = REQUIRED
        .iter()
        .map(|(name, keys)| Dependency::new(*name, env.first_of(keys)))
        .collect();
    deps.extend(
        OPTIONAL
            .iter()
            .filter_map(|(name, keys)| env.first_of(keys).map(|url| Dependency::new(*name, Some(url)))),
    );
    deps
}

/// `READY_TIMEOUT_MS` when it is a finite positive number, else `default_ms`.
/// Fractional values round up to the next millisecond.
pub fn resolve_timeout(env: &dyn EnvSource, default_ms: u64) -> u64 {
    env.non_empty(READY_TIMEOUT_ENV)
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| n.ceil() as u64)
        .unwrap_or(default_ms)
}

/// Probe a single dependency.
pub async fn probe(client: &Client, dep: &Dependency, timeout: Duration) -> CheckResult {
    let Some(base) = dep.base_url.as_deref() else {
        warn!(dependency = %dep.name, "readiness dependency not configured");
        return CheckResult::missing_config(&dep.name);
    };

    let url = join_url(base, "/ready");
    let start = Instant::now();
    let request = client.get(&url).header(ACCEPT, "application/json").send();
    let outcome = tokio::time::timeout(timeout, request).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (ok, status, error) = match outcome {
        Ok(Ok(resp)) => {
            let status = resp.status();
            (status.is_success(), Some(status.as_u16()), None)
        }
        Ok(Err(e)) => (false, None, Some(e.to_string())),
        Err(_) => (false, None, Some(format!("request timed out after {}ms", timeout.as_millis()))),
    };

    debug!(dependency = %dep.name, %url, ok, ?status, latency_ms, "readiness probe finished");

    CheckResult { name: dep.name.clone(), url, ok, status, latency_ms: Some(latency_ms), error }
}

/// Probe every dependency concurrently and wait for all of them.
pub async fn check_all(client: &Client, deps: &[Dependency], timeout_ms: u64) -> ReadinessReport {
    let timeout = Duration::from_millis(timeout_ms);
    let checks = join_all(deps.iter().map(|dep| probe(client, dep, timeout))).await;

    let status = if checks.iter().all(|c| c.ok) { HealthStatus::Ok } else { HealthStatus::Down };
    if status == HealthStatus::Down {
        let failing: Vec<&str> = checks.iter().filter(|c| !c.ok).map(|c| c.name.as_str()).collect();
        warn!(?failing, "readiness check failed");
    }

    ReadinessReport { status, service: SERVICE_NAME.to_string(), timeout_ms, checks }
}

/// Resolve dependencies and timeout from `env`, then run [`check_all`].
pub async fn check_env(client: &Client, env: &dyn EnvSource, default_timeout_ms: u64) -> ReadinessReport {
    let deps = resolve_dependencies(env);
    let timeout_ms = resolve_timeout(env, default_timeout_ms);
    check_all(client, &deps, timeout_ms).await
}
