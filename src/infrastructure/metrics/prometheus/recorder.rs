use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Mutex;
use std::sync::OnceLock;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

// Serializes installation so concurrent callers don't race the global recorder.
static INSTALL: Mutex<()> = Mutex::new(());

/// Initialize the Prometheus recorder globally and store the handle.
///
/// Calling this again after a successful install is a no-op.
pub fn init_metrics() -> Result<()> {
    // ---
    let _guard = INSTALL
        .lock()
        .map_err(|_| anyhow::anyhow!("metrics recorder install lock poisoned"))?;

    if HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;

    // Cannot already be set: we hold the install lock and checked above.
    let _ = HANDLE.set(handle);

    Ok(())
}

/// Render the current metrics in Prometheus text format.
///
/// Returns an empty string if the recorder was never installed.
pub fn render_metrics() -> String {
    HANDLE.get().map(PrometheusHandle::render).unwrap_or_default()
}
