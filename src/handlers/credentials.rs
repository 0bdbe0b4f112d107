//! Rotating check-in credential handlers.
//!
//! 1. `get_credential` - Return the event's current credential, issuing one if needed
//! 2. `revoke_credential` - Drop the event's credential so the next poll rotates

use super::auth::extract_session;
use super::shared_types::{api_error, ApiError};
use crate::app_state::AppState;
use crate::domain::Credential;
use crate::issuer::IssueError;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

/// The current credential for an event, as rendered into a QR code.
#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialResponse {
    // ---
    pub event_id: i32,
    pub token: String,
    /// RFC 3339 expiry, identical to the token's `exp` claim
    pub expires_at: String,
    pub issuer_id: String,
}

impl From<Credential> for CredentialResponse {
    fn from(c: Credential) -> Self {
        // ---
        CredentialResponse {
            event_id: c.event_id,
            token: c.token,
            expires_at: c.expires_at.to_rfc3339(),
            issuer_id: c.issuer_id,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Fails with 404 unless the event exists.
async fn ensure_event_exists(state: &AppState, event_id: i32) -> Result<(), ApiError> {
    // ---
    let exists = state
        .repository()
        .event_exists(event_id)
        .await
        .map_err(|e| {
            // ---
            tracing::error!("Failed to look up event {}: {}", event_id, e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to look up event")
        })?;

    if !exists {
        tracing::debug!("Event {} not found", event_id);
        return Err(api_error(StatusCode::NOT_FOUND, "Event not found"));
    }

    Ok(())
}

// ============================================================================
// Get Credential Handler
// ============================================================================

/// GET /events/{event_id}/credential
///
/// Returns the event's current rotating credential. Polled by the check-in
/// station; repeated calls within the validity window return the same token.
///
/// # Request Headers
/// ```text
/// Authorization: Bearer <session_token>
/// ```
///
/// # Errors
///
/// - 401 if the session is missing or invalid
/// - 404 if the event does not exist
/// - 500 for any signing or persistence failure (details are logged only)
#[tracing::instrument(skip(state, headers))]
pub async fn get_credential(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<i32>,
) -> Result<Json<CredentialResponse>, ApiError> {
    // ---
    let session_info = extract_session(&headers, &state).await?;

    ensure_event_exists(&state, event_id).await?;

    let credential = state
        .issuer()
        .get_or_issue(event_id, &session_info.user_id)
        .await
        .map_err(|e| match e {
            IssueError::MissingSubject => {
                tracing::warn!("Session for {} carries no subject id", session_info.username);
                api_error(StatusCode::UNAUTHORIZED, "Invalid or expired session")
            }
            other => {
                tracing::error!("Failed to get credential for event {}: {}", event_id, other);
                api_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch check-in credential",
                )
            }
        })?;

    Ok(Json(credential.into()))
}

// ============================================================================
// Revoke Credential Handler
// ============================================================================

/// DELETE /events/{event_id}/credential
///
/// Removes the event's stored credential so the next poll mints a new one.
/// The revoked token itself is not invalidated: check-in verification is
/// stateless, so it is accepted until its `exp`.
///
/// # Errors
///
/// - 401 if the session is missing or invalid
/// - 404 if there is no credential to revoke
/// - 500 if the delete fails
#[tracing::instrument(skip(state, headers))]
pub async fn revoke_credential(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    // ---
    let session_info = extract_session(&headers, &state).await?;

    let removed = state
        .repository()
        .delete_credential(event_id)
        .await
        .map_err(|e| {
            // ---
            tracing::error!("Failed to revoke credential for event {}: {}", event_id, e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to revoke credential")
        })?;

    if !removed {
        return Err(api_error(StatusCode::NOT_FOUND, "No credential to revoke"));
    }

    tracing::info!(
        "Credential for event {} revoked by {}",
        event_id,
        session_info.username
    );

    Ok(StatusCode::NO_CONTENT)
}
