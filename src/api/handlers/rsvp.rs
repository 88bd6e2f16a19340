use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{CancelRsvpRequest, DirectRsvpRequest};
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use serde_json::json;
use tracing::info;

pub async fn submit(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Json(payload): Json<DirectRsvpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_id(&payload.event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if event.rsvp_window_closed(Utc::now()) {
        return Err(AppError::Expired("RSVP period has ended".into()));
    }

    let guest = state.guest_repo.upsert_rsvp(&current.id, &payload.event_id, payload.rsvp).await?;
    info!("RSVP {:?} recorded for event {}", guest.rsvp, payload.event_id);
    Ok(Json(guest))
}

pub async fn cancel(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Json(payload): Json<CancelRsvpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let guest = state.guest_repo.cancel_rsvp(&current.id, &payload.event_id).await?;
    info!("RSVP cancelled for event {}", payload.event_id);
    Ok(Json(guest))
}

pub async fn status(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let guest = state.guest_repo.find_by_user_and_event(&current.id, &event_id).await?;
    Ok(Json(json!({ "rsvp": guest.map(|g| g.rsvp) })))
}
