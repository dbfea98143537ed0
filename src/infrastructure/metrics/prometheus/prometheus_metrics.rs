//! Prometheus metrics implementation.
//!
//! Delegates to the sibling `counters` and `recorder` modules, which talk to the
//! global `metrics` registry. A single global `PrometheusHandle` renders all
//! collected series in Prometheus text format.

use crate::domain::{LoginOutcome, Metrics};
use std::time::Instant;

/// Prometheus-based metrics implementation.
///
/// Holds no state: series are registered on first use through the `metrics`
/// macros and rendered through the handle kept in `recorder.rs`.
pub struct PrometheusMetrics {}

impl PrometheusMetrics {
    pub fn new() -> Self {
        tracing::info!("Creating Prometheus metrics");
        PrometheusMetrics {}
    }
}

impl Metrics for PrometheusMetrics {
    fn render(&self) -> String {
        super::render_metrics()
    }

    fn record_login(&self, outcome: LoginOutcome) {
        tracing::debug!("Recording login outcome {}", outcome.as_str());
        super::increment_login(outcome.as_str());
    }

    fn record_session_check(&self, accepted: bool) {
        super::increment_session_check(accepted);
    }

    fn record_review(&self, outcome: &'static str) {
        tracing::debug!("Recording review outcome {outcome}");
        super::increment_review(outcome);
    }

    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16) {
        super::track_http_request(start, path, method, status);
    }
}
