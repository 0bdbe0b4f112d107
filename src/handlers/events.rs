use super::auth::extract_session;
use super::shared_types::{api_error, ApiError};
use crate::app_state::AppState;
use crate::domain::Event;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    // ---
    pub name: String,
}

/// POST /events
///
/// Creates an event that credentials can be issued for.
///
/// - `201 Created` with the stored event
/// - `400 Bad Request` if the name is blank
/// - `401 Unauthorized` without a valid session
pub async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    // ---
    let session_info = extract_session(&headers, &state).await?;

    let name = req.name.trim();
    if name.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Event name is required"));
    }

    let event = state.repository().create_event(name).await.map_err(|e| {
        // ---
        tracing::error!("Failed to create event: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create event")
    })?;

    tracing::info!(
        "Event {} ({}) created by {}",
        event.id,
        event.name,
        session_info.username
    );

    Ok((StatusCode::CREATED, Json(event)))
}
