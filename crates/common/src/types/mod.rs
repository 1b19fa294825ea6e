use serde::{Deserialize, Serialize};

/// Name this process reports in health payloads.
pub const SERVICE_NAME: &str = "frontend";

/// Body of the liveness probe.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LiveResponse {
    pub status: String,
    pub service: String,
}

impl LiveResponse {
    pub fn frontend() -> Self {
        Self { status: "ok".into(), service: SERVICE_NAME.into() }
    }
}

/// Aggregate health state reported by readiness.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Down,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Ok => "ok",
            HealthStatus::Down => "down",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&HealthStatus::Down).unwrap(), "\"down\"");
        let live = serde_json::to_value(LiveResponse::frontend()).unwrap();
        assert_eq!(live, serde_json::json!({"status": "ok", "service": "frontend"}));
    }
}
