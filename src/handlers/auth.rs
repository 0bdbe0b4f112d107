//! Bearer session extraction shared by the protected handlers.

use super::shared_types::{api_error, ApiError};
use crate::app_state::AppState;
use crate::domain::SessionInfo;
use axum::http::{HeaderMap, StatusCode};

/// Extracts and validates the session token from the Authorization header.
///
/// Expects header format: "Authorization: Bearer <token>"
///
/// # Errors
///
/// Returns UNAUTHORIZED if:
/// - Authorization header is missing
/// - Header format is invalid (not "Bearer <token>")
/// - Token is unknown or expired
/// - The session has no subject id
///
/// Returns INTERNAL_SERVER_ERROR if the session store is unreachable.
pub(crate) async fn extract_session(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<SessionInfo, ApiError> {
    // ---
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| {
            // ---
            tracing::debug!("Missing Authorization header");
            api_error(StatusCode::UNAUTHORIZED, "Missing Authorization header")
        })?
        .to_str()
        .map_err(|_| {
            // ---
            tracing::debug!("Invalid Authorization header format");
            api_error(StatusCode::UNAUTHORIZED, "Invalid Authorization header")
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            // ---
            tracing::debug!("Authorization header missing Bearer prefix");
            api_error(StatusCode::UNAUTHORIZED, "Invalid Authorization header format")
        })?;

    let session = state
        .sessions()
        .validate_session(token)
        .await
        .map_err(|e| {
            // ---
            tracing::error!("Session lookup failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        })?;

    let session = session.ok_or_else(|| {
        // ---
        tracing::debug!("Invalid or expired session");
        api_error(StatusCode::UNAUTHORIZED, "Invalid or expired session")
    })?;

    // No subject to sign for or audit; refuse before any repository access.
    if session.user_id.is_empty() {
        tracing::warn!("Session for {} carries no subject id", session.username);
        return Err(api_error(
            StatusCode::UNAUTHORIZED,
            "Invalid or expired session",
        ));
    }

    Ok(session)
}
