use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{AddCohostRequest, CreateEventRequest, UpdateEventRequest};
use crate::domain::models::event::{Event, NewEventParams};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.title.is_empty() {
        return Err(AppError::Validation("Event title is required".into()));
    }
    if payload.end_at <= payload.start_at {
        return Err(AppError::Validation("Event end time must be after its start time".into()));
    }

    let event = Event::new(NewEventParams {
        title: payload.title,
        host_id: current.id,
        location: payload.location,
        address: payload.address,
        invite_message: payload.invite_message,
        image: payload.image,
        start_at: payload.start_at,
        end_at: payload.end_at,
    });

    let created = state.event_repo.create(&event).await?;
    info!("Created event: {}", created.id);
    Ok(Json(created))
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let events = state.event_repo.list_for_user(&current.id).await?;
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut event = state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if !state.event_repo.is_host_or_cohost(&event_id, &current.id).await? {
        return Err(AppError::Forbidden("Only event hosts and co-hosts can update the event".into()));
    }

    if let Some(title) = payload.title { event.title = title; }
    if let Some(location) = payload.location { event.location = Some(location); }
    if let Some(address) = payload.address { event.address = Some(address); }
    if let Some(message) = payload.invite_message { event.invite_message = Some(message); }
    if let Some(image) = payload.image { event.image = Some(image); }
    if let Some(start_at) = payload.start_at { event.start_at = start_at; }
    if let Some(end_at) = payload.end_at { event.end_at = end_at; }

    if event.end_at <= event.start_at {
        return Err(AppError::Validation("Event end time must be after its start time".into()));
    }

    let updated = state.event_repo.update(&event).await?;
    info!("Updated event: {}", updated.id);
    Ok(Json(updated))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if event.host_id != current.id {
        return Err(AppError::Forbidden("Only the event host can delete the event".into()));
    }

    state.event_repo.delete(&event_id).await?;
    info!("Deleted event: {}", event_id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn add_cohost(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<AddCohostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if event.host_id != current.id {
        return Err(AppError::Forbidden("Only the event host can manage co-hosts".into()));
    }

    let cohost = state.user_repo.find_by_id(&payload.user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    state.event_repo.add_cohost(&event_id, &cohost.id).await?;
    info!("Added co-host {} to event {}", cohost.id, event_id);
    Ok(Json(serde_json::json!({"status": "added"})))
}

pub async fn remove_cohost(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path((event_id, user_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if event.host_id != current.id {
        return Err(AppError::Forbidden("Only the event host can manage co-hosts".into()));
    }

    state.event_repo.remove_cohost(&event_id, &user_id).await?;
    info!("Removed co-host {} from event {}", user_id, event_id);
    Ok(Json(serde_json::json!({"status": "removed"})))
}
