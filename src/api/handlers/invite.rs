use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::{auth::AuthUser, maybe_auth::MaybeAuthUser};
use crate::api::dtos::requests::{BulkInviteRequest, GroupRsvpRequest};
use crate::api::dtos::responses::{BulkInviteResponse, FailedInvite, GuestListResponse, RsvpSubmissionResponse};
use crate::domain::models::guest::{AuthenticatedRsvpParams, Guest, GuestListFilter, Rsvp, RsvpSubmission};
use crate::domain::models::invite::Invite;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use serde_json::json;
use tracing::info;

pub async fn get_invite_details(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(current): MaybeAuthUser,
    Path(group_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let group = state.group_repo.find_by_id(&group_id).await?
        .ok_or(AppError::NotFound("Group invite not found".into()))?;

    let event = state.group_repo.find_primary_event(&group_id).await?
        .ok_or(AppError::NotFound("Group invite not found".into()))?;

    if event.rsvp_window_closed(Utc::now()) {
        return Err(AppError::Expired("This event has already started".into()));
    }

    let user_context = match &current {
        Some(current) => {
            let is_host_or_cohost = state.event_repo.is_host_or_cohost(&event.id, &current.id).await?;
            let existing_rsvp = state.guest_repo.find_by_user_and_event(&current.id, &event.id).await?;
            let user = state.user_repo.find_by_id(&current.id).await?;

            Some(json!({
                "is_host_or_cohost": is_host_or_cohost,
                "existing_rsvp": existing_rsvp,
                "user": user,
                "can_edit_rsvp": true,
            }))
        }
        None => None,
    };

    Ok(Json(json!({
        "group": group,
        "event": event,
        "user_context": user_context,
        "is_authenticated": current.is_some(),
    })))
}

pub async fn submit_rsvp(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(current): MaybeAuthUser,
    Path(group_id): Path<String>,
    Json(payload): Json<GroupRsvpRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.group_repo.find_by_id(&group_id).await?
        .ok_or(AppError::NotFound("Group not found".into()))?;

    let event = state.group_repo.find_primary_event(&group_id).await?
        .ok_or(AppError::NotFound("Group not found".into()))?;

    if event.rsvp_window_closed(Utc::now()) {
        return Err(AppError::Expired("Cannot submit RSVP - event has already started".into()));
    }

    if !matches!(payload.rsvp, Rsvp::Accepted | Rsvp::Declined | Rsvp::Maybe) {
        return Err(AppError::Validation("Invalid RSVP status".into()));
    }

    let submission = RsvpSubmission {
        rsvp: payload.rsvp,
        food: payload.food,
        alcohol: payload.alcohol,
        accommodation: payload.accommodation,
        count: payload.count,
    };

    match current {
        Some(current) => {
            let user = state.user_repo.find_by_id(&current.id).await?
                .ok_or(AppError::Unauthorized)?;

            // The submission may carry fresher contact details than the
            // account; they are refreshed in the same transaction.
            let new_name = payload.name.filter(|name| !name.is_empty() && *name != user.name);
            let new_email = payload.email.filter(|email| Some(email) != user.email.as_ref());

            let params = AuthenticatedRsvpParams {
                user_id: user.id.clone(),
                event_id: event.id.clone(),
                group_id: group_id.clone(),
                submission,
                new_name,
                new_email,
            };

            let (guest, updated) = state.guest_repo.submit_authenticated(&params).await?;

            info!("Authenticated RSVP for event {} by user {}", event.id, user.id);

            let message = if updated {
                "RSVP updated successfully".to_string()
            } else {
                "RSVP submitted successfully".to_string()
            };

            Ok(Json(RsvpSubmissionResponse {
                message,
                guest,
                is_web_submission: false,
                already_submitted: false,
                show_app_download: false,
            }))
        }
        None => {
            let name = payload.name.unwrap_or_default();
            let phone = payload.phone.unwrap_or_default();
            if name.is_empty() || phone.is_empty() {
                return Err(AppError::Validation("Name, phone number, and RSVP status are required".into()));
            }

            // The web channel is single-shot: an existing submission for
            // this phone is never overwritten by another anonymous post.
            if let Some(existing) = state.guest_repo.find_unlinked(&event.id, &group_id, &phone).await? {
                return Ok(Json(RsvpSubmissionResponse {
                    message: "You have already submitted your RSVP. Download our app to view or update it.".to_string(),
                    guest: existing,
                    is_web_submission: true,
                    already_submitted: true,
                    show_app_download: true,
                }));
            }

            let mut guest = Guest::new_unlinked(
                event.id.clone(),
                Some(group_id.clone()),
                name,
                phone,
                payload.email,
            );
            guest.apply_submission(&submission);

            let created = state.guest_repo.create_unlinked(&guest).await?;

            info!("Anonymous RSVP for event {} via group {}", event.id, group_id);

            Ok(Json(RsvpSubmissionResponse {
                message: web_rsvp_message(created.rsvp).to_string(),
                guest: created,
                is_web_submission: true,
                already_submitted: false,
                show_app_download: true,
            }))
        }
    }
}

fn web_rsvp_message(rsvp: Rsvp) -> &'static str {
    match rsvp {
        Rsvp::Accepted => "Great! Your RSVP has been confirmed. Download our app to manage all your event RSVPs and get updates!",
        Rsvp::Declined => "Thanks for letting us know. Download our app to stay updated on future events!",
        Rsvp::Maybe => "Thanks for your response! Download our app to update your RSVP anytime and manage all your events!",
        Rsvp::NoResponse => "Thanks! Your response has been recorded. Download our app to manage all your event RSVPs and get updates!",
        Rsvp::FailedDelivery => "We received your submission, but there was an issue delivering the response. Download our app for updates and to manage your RSVP.",
    }
}

pub async fn bulk_invites(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<BulkInviteRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.invites.is_empty() {
        return Err(AppError::Validation("Invites array is required".into()));
    }

    state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if !state.event_repo.is_host_or_cohost(&event_id, &current.id).await? {
        return Err(AppError::Forbidden("Only event hosts and co-hosts can create invites".into()));
    }

    let mut created = Vec::new();
    let mut failed = Vec::new();

    for entry in payload.invites {
        if state.invite_repo.find_by_phone_and_event(&entry.phone, &event_id).await?.is_some() {
            failed.push(FailedInvite {
                entry,
                reason: "Invite already exists for this phone number and event".to_string(),
            });
            continue;
        }

        let invite = Invite::new(
            event_id.clone(),
            entry.group_id.clone(),
            entry.name.clone(),
            entry.phone.clone(),
            entry.email.clone(),
        );

        match state.invite_repo.create(&invite).await {
            Ok(invite) => created.push(invite),
            Err(e) => failed.push(FailedInvite {
                entry,
                reason: e.to_string(),
            }),
        }
    }

    info!("Bulk invite import for event {}: {} created, {} failed", event_id, created.len(), failed.len());
    Ok(Json(BulkInviteResponse { created, failed }))
}

pub async fn list_invites(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if !state.event_repo.is_host_or_cohost(&event_id, &current.id).await? {
        return Err(AppError::Forbidden("Only event hosts and co-hosts can view invites".into()));
    }

    let invites = state.invite_repo.list_by_event(&event_id).await?;
    Ok(Json(invites))
}

pub async fn guest_list(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path(event_id): Path<String>,
    Query(filter): Query<GuestListFilter>,
) -> Result<impl IntoResponse, AppError> {
    state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if !state.event_repo.is_host_or_cohost(&event_id, &current.id).await? {
        return Err(AppError::Forbidden("Access denied. Only hosts and co-hosts can view the guest list".into()));
    }

    let guests = state.guest_repo.list_by_event(&event_id, &filter).await?;

    let (linked, unlinked): (Vec<Guest>, Vec<Guest>) =
        guests.into_iter().partition(|guest| guest.is_linked());

    Ok(Json(GuestListResponse {
        total: linked.len() + unlinked.len(),
        linked,
        unlinked,
    }))
}

pub async fn rsvp_summary(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if !state.event_repo.is_host_or_cohost(&event_id, &current.id).await? {
        return Err(AppError::Forbidden("Access denied. Only hosts and co-hosts can view the RSVP summary".into()));
    }

    let summary = state.guest_repo.rsvp_summary(&event_id).await?;
    Ok(Json(summary))
}

pub async fn my_rsvps(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let rsvps = state.guest_repo.list_user_rsvps(&current.id).await?;
    Ok(Json(json!({ "rsvps": rsvps })))
}
