//! Check-in verification.
//!
//! An attendee's device scans the station's QR code and presents the token
//! here. Only signature and expiry are checked; recording attendance is up
//! to the caller.

use super::auth::extract_session;
use super::shared_types::{api_error, ApiError};
use crate::app_state::AppState;
use crate::token::TokenError;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CheckinRequest {
    // ---
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckinResponse {
    // ---
    pub event_id: i32,
    /// Attendee presenting the token
    pub subject_id: String,
    /// Subject who issued the token at the station
    pub issuer_id: String,
}

/// POST /events/{event_id}/checkin
///
/// # Request Body
/// ```json
/// { "token": "<compact token from the QR code>" }
/// ```
///
/// # Errors
///
/// - 401 if the session is missing/invalid, or the token is forged or expired
/// - 400 if the token belongs to a different event
#[tracing::instrument(skip(state, headers, req))]
pub async fn verify_checkin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<i32>,
    Json(req): Json<CheckinRequest>,
) -> Result<Json<CheckinResponse>, ApiError> {
    // ---
    let session_info = extract_session(&headers, &state).await?;

    let issuer = state.issuer();
    let claims = issuer
        .signer()
        .verify_for_event(&req.token, event_id, issuer.now())
        .map_err(|e| {
            // ---
            state.metrics().record_verification(e.outcome());
            tracing::warn!(
                "Rejected check-in for event {} by {}: {}",
                event_id,
                session_info.username,
                e
            );
            match e {
                TokenError::EventMismatch { .. } => {
                    api_error(StatusCode::BAD_REQUEST, "Token is for a different event")
                }
                TokenError::Expired => api_error(StatusCode::UNAUTHORIZED, "Token expired"),
                TokenError::Invalid(_) => api_error(StatusCode::UNAUTHORIZED, "Invalid token"),
            }
        })?;

    state.metrics().record_verification("accepted");
    tracing::info!(
        "Accepted check-in for event {} by {}",
        event_id,
        session_info.username
    );

    Ok(Json(CheckinResponse {
        event_id: claims.event_id,
        subject_id: session_info.user_id,
        issuer_id: claims.sub,
    }))
}
