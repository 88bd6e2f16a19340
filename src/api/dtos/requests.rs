use crate::domain::models::guest::Rsvp;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct SendOtpRequest {
    pub phone: String,
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub code: String,
}

#[derive(Deserialize)]
pub struct OnboardRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub profile_pic: Option<String>,
    pub preferred_language: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub preferred_language: Option<String>,
}

#[derive(Deserialize)]
pub struct UploadPictureRequest {
    pub filename: String,
    pub content_base64: String,
}

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub location: Option<String>,
    pub address: Option<String>,
    pub invite_message: Option<String>,
    pub image: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub invite_message: Option<String>,
    pub image: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct AddCohostRequest {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct UpdateGroupRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct MemberRequest {
    pub phone: String,
}

#[derive(Deserialize)]
pub struct GroupRsvpRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub rsvp: Rsvp,
    pub food: Option<String>,
    pub alcohol: Option<String>,
    pub accommodation: Option<String>,
    pub count: Option<i32>,
}

#[derive(Deserialize)]
pub struct DirectRsvpRequest {
    pub event_id: String,
    pub rsvp: Rsvp,
}

#[derive(Deserialize)]
pub struct CancelRsvpRequest {
    pub event_id: String,
}

#[derive(Deserialize)]
pub struct BulkInviteRequest {
    pub invites: Vec<BulkInviteEntry>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct BulkInviteEntry {
    pub name: String,
    pub phone: String,
    pub group_id: String,
    pub email: Option<String>,
}
