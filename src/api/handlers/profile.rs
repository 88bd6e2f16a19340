use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{UpdateProfileRequest, UploadPictureRequest};
use crate::error::AppError;
use std::sync::Arc;
use base64::{Engine as _, engine::general_purpose};
use tracing::info;

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_id(&current.id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;
    Ok(Json(user))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut user = state.user_repo.find_by_id(&current.id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    if let Some(name) = payload.name {
        if name.is_empty() {
            return Err(AppError::Validation("Name cannot be empty".into()));
        }
        user.name = name;
    }
    if let Some(email) = payload.email {
        user.email = Some(email);
    }
    if let Some(dob) = payload.dob {
        user.dob = Some(dob);
    }
    if let Some(gender) = payload.gender {
        user.gender = Some(gender);
    }
    if let Some(language) = payload.preferred_language {
        user.preferred_language = Some(language);
    }

    let updated = state.user_repo.update(&user).await?;
    info!("Updated profile for user: {}", updated.id);
    Ok(Json(updated))
}

pub async fn upload_profile_picture(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Json(payload): Json<UploadPictureRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut user = state.user_repo.find_by_id(&current.id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    let data = general_purpose::STANDARD.decode(&payload.content_base64)
        .map_err(|_| AppError::Validation("Invalid base64 image payload".into()))?;

    let key = format!("{}/{}", user.id, payload.filename);
    let url = state.storage.upload(&data, &key).await?;

    user.profile_pic = Some(url);
    let updated = state.user_repo.update(&user).await?;

    info!("Uploaded profile picture for user: {}", updated.id);
    Ok(Json(updated))
}
