use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::models::user::VerificationStatus;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,

    #[serde(rename = "https://guestlist.app/claims/phone")]
    pub phone: String,

    #[serde(rename = "https://guestlist.app/claims/csrf")]
    pub csrf_token: String,
}

/// The identity asserted by a validated access token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub phone: String,
}

#[derive(Debug, FromRow)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: String,
    pub family_id: Uuid,
    pub generation_id: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub csrf_token: String,
    pub user: UserProfile,
}

#[derive(Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub verification_status: VerificationStatus,
}
