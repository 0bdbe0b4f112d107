use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Error body returned by every failing endpoint.
///
/// Messages are deliberately generic; details go to the log.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    // ---
    pub error: String,
}

/// Rejection type shared by the JSON handlers.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Builds an [`ApiError`] with the given status and message.
pub fn api_error(status: StatusCode, message: &str) -> ApiError {
    // ---
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}
