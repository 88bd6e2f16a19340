use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub host_id: String,
    pub location: Option<String>,
    pub address: Option<String>,
    pub invite_message: Option<String>,
    pub image: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

pub struct NewEventParams {
    pub title: String,
    pub host_id: String,
    pub location: Option<String>,
    pub address: Option<String>,
    pub invite_message: Option<String>,
    pub image: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl Event {
    pub fn new(params: NewEventParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: params.title,
            host_id: params.host_id,
            location: params.location,
            address: params.address,
            invite_message: params.invite_message,
            image: params.image,
            start_at: params.start_at,
            end_at: params.end_at,
            created_at: Utc::now(),
        }
    }

    /// The RSVP window closes the moment the event starts.
    pub fn rsvp_window_closed(&self, now: DateTime<Utc>) -> bool {
        now > self.start_at
    }
}

/// An event annotated with the requesting user's strongest role
/// (host > cohost > guest).
#[derive(Debug, Serialize, FromRow)]
pub struct EventWithRole {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub user_role: String,
}
