use crate::app_state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Handler for the `/metrics` endpoint.
///
/// Renders issuance and verification counters in Prometheus text format.
/// With the no-op backend the body is empty.
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    // ---
    let body = state.metrics().render();
    (StatusCode::OK, [("content-type", PROMETHEUS_CONTENT_TYPE)], body)
}
