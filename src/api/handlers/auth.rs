use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::{OnboardRequest, SendOtpRequest, VerifyOtpRequest};
use crate::domain::models::auth::UserProfile;
use crate::domain::models::user::{NewUserParams, User, VerificationStatus};
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use serde_json::json;
use tracing::info;

pub async fn send_otp(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SendOtpRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.phone.is_empty() {
        return Err(AppError::Validation("Phone number is required".into()));
    }

    state.otp_service.send(&payload.phone).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.phone.is_empty() || payload.code.is_empty() {
        return Err(AppError::Validation("Phone number and code are required".into()));
    }

    let approved = state.otp_service.verify(&payload.phone, &payload.code).await?;
    if !approved {
        return Err(AppError::Unauthorized);
    }

    match state.user_repo.find_by_phone(&payload.phone).await? {
        Some(user) => {
            // Existing account, verified or not: promote and fold in any
            // anonymous RSVP history before issuing tokens.
            let outcome = state.reconciliation.verify_and_link(&user).await?;

            let user = state.user_repo.find_by_id(&user.id).await?
                .ok_or(AppError::Internal)?;

            let (access_jwt, refresh_token, csrf_token) = state.auth_service.login(&user).await?;
            set_cookies(&cookies, &access_jwt, &refresh_token);

            info!("User verified via OTP: {}", user.id);

            Ok(Json(json!({
                "needs_onboarding": false,
                "csrf_token": csrf_token,
                "user": profile(&user),
                "reconciliation": outcome,
            })))
        }
        None => {
            // No account yet: remember the verified phone so onboarding can
            // complete without a second challenge.
            state.verification_repo.record(&payload.phone).await?;

            info!("Phone verified ahead of onboarding");

            Ok(Json(json!({ "needs_onboarding": true })))
        }
    }
}

pub async fn onboard(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<OnboardRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.is_empty() || payload.phone.is_empty() {
        return Err(AppError::Validation("Name and phone number are required".into()));
    }

    if state.verification_repo.find(&payload.phone).await?.is_none() {
        return Err(AppError::Forbidden("Phone number has not completed verification".into()));
    }

    if state.user_repo.find_by_phone(&payload.phone).await?.is_some() {
        return Err(AppError::AlreadyExists("An account already exists for this phone number".into()));
    }

    let user = User::new(NewUserParams {
        phone: payload.phone.clone(),
        name: payload.name,
        email: payload.email,
        dob: payload.dob,
        gender: payload.gender,
        profile_pic: payload.profile_pic,
        preferred_language: payload.preferred_language,
        verification_status: VerificationStatus::Verified,
    });

    let created = state.user_repo.create(&user).await?;
    state.verification_repo.consume(&payload.phone).await?;

    let outcome = state.reconciliation.link_rsvps(&created).await?;

    let (access_jwt, refresh_token, csrf_token) = state.auth_service.login(&created).await?;
    set_cookies(&cookies, &access_jwt, &refresh_token);

    info!("User onboarded: {}", created.id);

    Ok(Json(json!({
        "csrf_token": csrf_token,
        "user": profile(&created),
        "reconciliation": outcome,
    })))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    let refresh_cookie = cookies.get("refresh_token").ok_or(AppError::Unauthorized)?;
    let raw_token = refresh_cookie.value();

    let token_hash = state.auth_service.hash_token(raw_token);
    let record = state.auth_repo.find_refresh_token(&token_hash).await?
        .ok_or(AppError::Unauthorized)?;

    let user = state.user_repo.find_by_id(&record.user_id).await?
        .ok_or(AppError::Unauthorized)?;

    let (new_access, new_refresh, new_csrf) = state.auth_service.refresh(raw_token, &user).await?;

    set_cookies(&cookies, &new_access, &new_refresh);

    info!("Token refreshed for user: {}", user.id);

    Ok(Json(json!({
        "csrf_token": new_csrf,
        "user": profile(&user),
    })))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = cookies.get("refresh_token") {
        let _ = state.auth_service.logout(cookie.value()).await;
    }

    cookies.remove(Cookie::build(("access_token", "")).path("/").into());
    cookies.remove(Cookie::build(("refresh_token", "")).path("/").into());

    info!("User logged out");

    Ok(StatusCode::OK)
}

fn profile(user: &User) -> UserProfile {
    UserProfile {
        id: user.id.clone(),
        name: user.name.clone(),
        phone: user.phone.clone(),
        verification_status: user.verification_status,
    }
}

fn set_cookies(cookies: &Cookies, access: &str, refresh: &str) {
    let mut access_c = Cookie::new("access_token", access.to_string());
    access_c.set_http_only(true);
    access_c.set_secure(true);
    access_c.set_same_site(SameSite::Strict);
    access_c.set_path("/");
    access_c.set_max_age(Duration::minutes(15));
    cookies.add(access_c);

    let mut refresh_c = Cookie::new("refresh_token", refresh.to_string());
    refresh_c.set_http_only(true);
    refresh_c.set_secure(true);
    refresh_c.set_same_site(SameSite::Strict);
    refresh_c.set_path("/");
    refresh_c.set_max_age(Duration::days(7));
    cookies.add(refresh_c);
}
