use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec, TextEncoder,
};
use service::readiness::{CheckResult, ReadinessReport};

use crate::errors::ApiError;

pub static READY_CHECKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "frontend_ready_checks_total",
        "Readiness probes by dependency and outcome",
        &["dependency", "outcome"]
    )
    .expect("register ready_checks_total")
});

pub static READY_PROBE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "frontend_ready_probe_duration_seconds",
        "Readiness probe latency in seconds",
        &["dependency"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 1.5, 2.5, 5.0]
    )
    .expect("register ready_probe_duration")
});

/// Label for a single probe result.
pub fn outcome(check: &CheckResult) -> &'static str {
    match (check.ok, check.status, check.latency_ms) {
        (true, _, _) => "ok",
        (false, Some(_), _) => "unavailable",
        (false, None, None) => "unconfigured",
        (false, None, Some(_)) => "error",
    }
}

pub fn record_report(report: &ReadinessReport) {
    for check in &report.checks {
        READY_CHECKS_TOTAL.with_label_values(&[check.name.as_str(), outcome(check)]).inc();
        if let Some(ms) = check.latency_ms {
            READY_PROBE_DURATION.with_label_values(&[check.name.as_str()]).observe(ms as f64 / 1000.0);
        }
    }
}

/// Render the default registry in the Prometheus text format.
pub fn encode_metrics() -> Result<String, ApiError> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| ApiError::internal(format!("metrics encode error: {e}")))?;
    String::from_utf8(buffer).map_err(|e| ApiError::internal(format!("metrics are not utf-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(ok: bool, status: Option<u16>, latency_ms: Option<u64>) -> CheckResult {
        CheckResult { name: "auth-service".into(), url: String::new(), ok, status, latency_ms, error: None }
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(outcome(&check(true, Some(200), Some(3))), "ok");
        assert_eq!(outcome(&check(false, Some(503), Some(3))), "unavailable");
        assert_eq!(outcome(&check(false, None, Some(1500))), "error");
        assert_eq!(outcome(&check(false, None, None)), "unconfigured");
    }

    #[test]
    fn encodes_recorded_checks() {
        let report = ReadinessReport {
            status: common::types::HealthStatus::Down,
            service: "frontend".into(),
            timeout_ms: 1500,
            checks: vec![CheckResult { name: "order-service".into(), ..check(false, Some(503), Some(12)) }],
        };
        record_report(&report);
        let text = encode_metrics().unwrap();
        assert!(text.contains(r#"frontend_ready_checks_total{dependency="order-service",outcome="unavailable"}"#));
        assert!(text.contains("frontend_ready_probe_duration_seconds_bucket"));
    }
}
