use crate::domain::Metrics;
use std::time::Instant;

/// No-op metrics implementation for testing.
#[derive(Debug, Default)]
pub struct NoopMetrics;

impl NoopMetrics {
    pub fn new() -> Self {
        NoopMetrics
    }
}

impl Metrics for NoopMetrics {
    // ---
    fn render(&self) -> String {
        String::new()
    }
    fn record_credential_issued(&self) {}
    fn record_credential_reused(&self) {}
    fn record_issue_duration(&self, _: Instant) {}
    fn record_verification(&self, _: &'static str) {}
}
