//! Prometheus metrics implementation.
//!
//! This module provides a concrete implementation of the `Metrics` trait using
//! the Prometheus metrics format. It delegates to utility functions in sibling
//! modules (`counters.rs`, `recorder.rs`) which handle the actual metrics
//! collection via the global `metrics` crate registry.

use crate::domain::Metrics;
use std::time::Instant;

/// Prometheus-based metrics implementation.
///
/// Empty because metrics are registered globally through the `metrics`
/// macros; the `PrometheusHandle` in `recorder.rs` renders them.
#[derive(Debug, Default)]
pub struct PrometheusMetrics {
    // Empty - uses global metrics registry pattern
}

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

    fn record_credential_issued(&self) {
        tracing::debug!("Recording credential issued event");
        super::increment_credentials_issued();
    }

    fn record_credential_reused(&self) {
        super::increment_credentials_reused();
    }

    fn record_issue_duration(&self, start: Instant) {
        super::track_issue_duration(start);
    }

    fn record_verification(&self, outcome: &'static str) {
        tracing::debug!("Recording verification outcome: {}", outcome);
        super::increment_verifications(outcome);
    }
}
