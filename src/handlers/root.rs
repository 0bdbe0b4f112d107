use axum::response::IntoResponse;

pub async fn root_handler() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        r#"Welcome to the Check-in Credential API 👋
Version: {version}

Available endpoints:
  - POST   /events                         - Create an event
  - GET    /events/{{id}}/credential         - Current rotating check-in credential
  - DELETE /events/{{id}}/credential         - Revoke the current credential
  - POST   /events/{{id}}/checkin            - Verify a scanned credential
  - GET    /health                         - Light health check
  - GET    /health?mode=full               - Full health check (session store + database)
  - GET    /metrics                        - Prometheus metrics

Event routes require an "Authorization: Bearer <session token>" header.
"#
    )
}
