use std::sync::Arc;
use std::time::Instant;

/// Abstraction for application metrics (counters, histograms).
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Record that a new credential was minted and stored.
    fn record_credential_issued(&self);

    /// Record that a still-valid credential was handed out again.
    fn record_credential_reused(&self);

    /// Record how long a get-or-issue call took.
    fn record_issue_duration(&self, start: Instant);

    /// Record a check-in verification outcome ("accepted", "expired", ...).
    fn record_verification(&self, outcome: &'static str);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
