use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static HANDLE: OnceLock<Result<PrometheusHandle, String>> = OnceLock::new();

/// Install the Prometheus recorder globally and store the handle.
///
/// The recorder is process-wide, so only the first call installs anything and
/// every later router (tests build many) shares it. A failed install is
/// remembered and reported to every caller.
pub fn init_metrics() -> anyhow::Result<()> {
    // ---
    HANDLE
        .get_or_init(|| {
            PrometheusBuilder::new()
                .install_recorder()
                .map_err(|err| err.to_string())
        })
        .as_ref()
        .map(|_| ())
        .map_err(|err| anyhow::anyhow!("failed to install Prometheus recorder: {err}"))
}

/// Render the current metrics in Prometheus text format.
pub fn render_metrics() -> String {
    match HANDLE.get() {
        Some(Ok(handle)) => handle.render(),
        _ => String::new(),
    }
}
