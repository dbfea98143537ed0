mod counters;
mod prometheus_metrics;
mod recorder;

pub use prometheus_metrics::PrometheusMetrics;
use std::sync::Arc;

pub(crate) use counters::{
    increment_login, increment_review, increment_session_check, track_http_request,
};
pub(crate) use recorder::{init_metrics, render_metrics};

/// Creates the Prometheus metrics implementation.
///
/// Installs the global recorder on first use; later calls reuse it.
pub fn create() -> anyhow::Result<crate::domain::MetricsPtr> {
    tracing::info!("Initializing Prometheus metrics");
    init_metrics()?;

    Ok(Arc::new(PrometheusMetrics::new()))
}
