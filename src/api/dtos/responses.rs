use crate::api::dtos::requests::BulkInviteEntry;
use crate::domain::models::guest::Guest;
use crate::domain::models::invite::Invite;
use serde::Serialize;

#[derive(Serialize)]
pub struct RsvpSubmissionResponse {
    pub message: String,
    pub guest: Guest,
    pub is_web_submission: bool,
    pub already_submitted: bool,
    pub show_app_download: bool,
}

#[derive(Serialize)]
pub struct GuestListResponse {
    pub total: usize,
    pub linked: Vec<Guest>,
    pub unlinked: Vec<Guest>,
}

#[derive(Serialize)]
pub struct FailedInvite {
    #[serde(flatten)]
    pub entry: BulkInviteEntry,
    pub reason: String,
}

#[derive(Serialize)]
pub struct BulkInviteResponse {
    pub created: Vec<Invite>,
    pub failed: Vec<FailedInvite>,
}
