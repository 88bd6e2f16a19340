use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{CreateGroupRequest, MemberRequest, UpdateGroupRequest};
use crate::domain::models::auth::CurrentUser;
use crate::domain::models::group::{GroupMember, GuestGroup, InviteLink};
use crate::error::AppError;
use std::sync::Arc;
use serde_json::{json, Value};
use tracing::info;

async fn authorize_host(state: &AppState, event_id: &str, user: &CurrentUser) -> Result<(), AppError> {
    state.event_repo.find_by_id(event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if !state.event_repo.is_host_or_cohost(event_id, &user.id).await? {
        return Err(AppError::Forbidden("Only event hosts and co-hosts can manage guest groups".into()));
    }
    Ok(())
}

pub async fn create_group(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.is_empty() {
        return Err(AppError::Validation("Group name is required".into()));
    }

    authorize_host(&state, &event_id, &current).await?;

    let group = GuestGroup::new(payload.name, current.id);
    let created = state.group_repo.create_with_event(&group, &event_id).await?;

    info!("Created guest group {} for event {}", created.id, event_id);
    Ok(Json(created))
}

pub async fn list_groups(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    authorize_host(&state, &event_id, &current).await?;

    let groups = state.group_repo.list_by_event(&event_id).await?;
    Ok(Json(groups))
}

pub async fn get_group(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path((event_id, group_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    authorize_host(&state, &event_id, &current).await?;

    let group = state.group_repo.find_by_id(&group_id).await?
        .ok_or(AppError::NotFound("Guest group not found".into()))?;
    let members = state.group_repo.list_members(&group_id).await?;

    Ok(Json(json!({ "group": group, "members": members })))
}

pub async fn update_group(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path((event_id, group_id)): Path<(String, String)>,
    Json(payload): Json<UpdateGroupRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.is_empty() {
        return Err(AppError::Validation("Group name is required".into()));
    }

    authorize_host(&state, &event_id, &current).await?;

    let updated = state.group_repo.rename(&group_id, &payload.name).await?;
    info!("Renamed guest group: {}", group_id);
    Ok(Json(updated))
}

pub async fn delete_group(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path((event_id, group_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    authorize_host(&state, &event_id, &current).await?;

    state.group_repo.delete(&group_id).await?;
    info!("Deleted guest group: {}", group_id);
    Ok(Json(json!({ "status": "deleted" })))
}

pub async fn add_member(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path((event_id, group_id)): Path<(String, String)>,
    Json(payload): Json<MemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.phone.is_empty() {
        return Err(AppError::Validation("Phone number is required".into()));
    }

    authorize_host(&state, &event_id, &current).await?;

    state.group_repo.find_by_id(&group_id).await?
        .ok_or(AppError::NotFound("Guest group not found".into()))?;

    // An unknown phone gets a placeholder account; it stays unverified
    // until its owner completes an OTP challenge.
    let user = state.user_repo.ensure_by_phone(&payload.phone).await?;

    if state.group_repo.is_member(&group_id, &user.id).await? {
        return Err(AppError::AlreadyExists("User is already a member of this group".into()));
    }

    let member = GroupMember::new(group_id.clone(), user.id.clone(), current.id);
    let created = state.group_repo.add_member(&member).await?;

    info!("Added member {} to group {}", user.id, group_id);
    Ok(Json(json!({ "member": created, "user": user })))
}

pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path((event_id, group_id)): Path<(String, String)>,
    Json(payload): Json<MemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.phone.is_empty() {
        return Err(AppError::Validation("Phone number is required".into()));
    }

    authorize_host(&state, &event_id, &current).await?;

    let user = state.user_repo.find_by_phone(&payload.phone).await?
        .ok_or(AppError::NotFound("User not found with this phone number".into()))?;

    state.group_repo.remove_member(&group_id, &user.id).await?;

    info!("Removed member {} from group {}", user.id, group_id);
    Ok(Json(json!({ "status": "removed" })))
}

pub async fn attach_group(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path((event_id, group_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    authorize_host(&state, &event_id, &current).await?;

    state.group_repo.find_by_id(&group_id).await?
        .ok_or(AppError::NotFound("Guest group not found".into()))?;

    let members = state.group_repo.list_members(&group_id).await?;
    let member_ids: Vec<String> = members.into_iter().map(|u| u.id).collect();

    let created = state.guest_repo.attach_group_to_event(&event_id, &group_id, &member_ids).await?;

    info!("Attached group {} to event {} ({} guest records created)", group_id, event_id, created.len());
    Ok(Json(json!({ "created": created, "count": created.len() })))
}

pub async fn list_invite_links(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path((event_id, group_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    authorize_host(&state, &event_id, &current).await?;

    let links = state.group_repo.list_invite_links(&group_id).await?;
    let frontend_url = &state.config.frontend_url;
    let links: Vec<Value> = links.into_iter().map(|link| {
        json!({ "invite_link": link.url(frontend_url), "link": link })
    }).collect();

    Ok(Json(links))
}

pub async fn generate_invite_link(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path((event_id, group_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    authorize_host(&state, &event_id, &current).await?;

    if !state.group_repo.is_attached(&event_id, &group_id).await? {
        return Err(AppError::NotFound("Group not found or not associated with this event".into()));
    }

    let link = InviteLink::new(group_id.clone(), current.id);
    let created = state.group_repo.create_invite_link(&link).await?;

    info!("Generated invite link for group {}", group_id);
    Ok(Json(json!({
        "invite_link": created.url(&state.config.frontend_url),
        "link": created,
    })))
}
