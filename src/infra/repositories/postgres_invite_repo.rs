use crate::domain::{models::invite::Invite, ports::InviteRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresInviteRepo {
    pool: PgPool,
}

impl PostgresInviteRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InviteRepository for PostgresInviteRepo {
    async fn create(&self, invite: &Invite) -> Result<Invite, AppError> {
        sqlx::query_as::<_, Invite>(
            "INSERT INTO invites (id, event_id, group_id, name, phone, email, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
            .bind(&invite.id)
            .bind(&invite.event_id)
            .bind(&invite.group_id)
            .bind(&invite.name)
            .bind(&invite.phone)
            .bind(&invite.email)
            .bind(invite.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_phone_and_event(&self, phone: &str, event_id: &str) -> Result<Option<Invite>, AppError> {
        sqlx::query_as::<_, Invite>("SELECT * FROM invites WHERE phone = $1 AND event_id = $2")
            .bind(phone)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Invite>, AppError> {
        sqlx::query_as::<_, Invite>("SELECT * FROM invites WHERE event_id = $1 ORDER BY created_at ASC")
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
