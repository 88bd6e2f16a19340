use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A bulk-imported invitee: an intended guest before any RSVP exists.
/// Unique per (phone, event).
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Invite {
    pub id: String,
    pub event_id: String,
    pub group_id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    pub fn new(
        event_id: String,
        group_id: String,
        name: String,
        phone: String,
        email: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            group_id,
            name,
            phone,
            email,
            created_at: Utc::now(),
        }
    }
}
