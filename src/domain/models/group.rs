use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct GuestGroup {
    pub id: String,
    pub name: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl GuestGroup {
    pub fn new(name: String, created_by: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            created_by,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct GroupMember {
    pub group_id: String,
    pub user_id: String,
    pub added_by: String,
    pub created_at: DateTime<Utc>,
}

impl GroupMember {
    pub fn new(group_id: String, user_id: String, added_by: String) -> Self {
        Self {
            group_id,
            user_id,
            added_by,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct InviteLink {
    pub id: String,
    pub group_id: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl InviteLink {
    pub fn new(group_id: String, created_by: String) -> Self {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(24)
            .map(char::from)
            .collect();

        Self {
            id,
            group_id,
            created_by,
            created_at: Utc::now(),
        }
    }

    pub fn url(&self, frontend_url: &str) -> String {
        format!("{}/invite/{}", frontend_url, self.group_id)
    }
}
