use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

#[derive(serde::Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

#[derive(Deserialize)]
pub struct HealthQuery {
    mode: Option<String>,
}

/// Responds with the health status of the server.
///
/// - By default (no query parameters), performs a light check to confirm the web server
///   is running.
///
/// - If `mode=full` is passed as a query parameter, also pings the session store and
///   the credential repository.
///
/// # Responses
/// - `200 OK` with `{ "status": "ok" }` if the server (and backends, in full mode) are healthy.
/// - `500 INTERNAL SERVER ERROR` with `{ "status": "error" }` if a backend ping fails in full mode.
pub async fn health_check(
    State(state): State<AppState>,
    Query(params): Query<HealthQuery>,
) -> (StatusCode, Json<HealthResponse>) {
    match params.mode.as_deref() {
        Some("full") => {
            let sessions = state.sessions().ping().await;
            let repository = state.repository().ping().await;

            match (sessions, repository) {
                (Ok(()), Ok(())) => (StatusCode::OK, Json(HealthResponse { status: "ok" })),
                (sessions, repository) => {
                    if let Err(e) = sessions {
                        tracing::error!("Session store health check failed: {}", e);
                    }
                    if let Err(e) = repository {
                        tracing::error!("Repository health check failed: {}", e);
                    }
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(HealthResponse { status: "error" }),
                    )
                }
            }
        }
        _ => {
            // Light health check
            (StatusCode::OK, Json(HealthResponse { status: "ok" }))
        }
    }
}
