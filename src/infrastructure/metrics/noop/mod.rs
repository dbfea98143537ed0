mod noop_metrics;

pub use noop_metrics::NoopMetrics;
use std::sync::Arc;

/// Creates the no-op metrics implementation.
///
/// Every call is ignored and `/metrics` renders empty. Used when metrics are
/// disabled and in most tests.
pub fn create() -> anyhow::Result<crate::domain::MetricsPtr> {
    Ok(Arc::new(NoopMetrics::new()))
}
