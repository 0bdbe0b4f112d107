use metrics::{counter, histogram};
use std::time::Instant;

/// Increment the counter of newly minted credentials.
pub fn increment_credentials_issued() {
    counter!("checkin_credentials_issued_total").increment(1);
}

/// Increment the counter of credentials served again while still valid.
pub fn increment_credentials_reused() {
    counter!("checkin_credentials_reused_total").increment(1);
}

/// Track get-or-issue latency using a histogram.
pub fn track_issue_duration(start: Instant) {
    let elapsed = start.elapsed();
    histogram!("checkin_issue_duration_seconds").record(elapsed);
}

/// Count check-in verifications by outcome.
pub fn increment_verifications(outcome: &'static str) {
    counter!("checkin_verifications_total", "outcome" => outcome).increment(1);
}
