use crate::domain::{
    models::{event::Event, group::{GroupMember, GuestGroup, InviteLink}, user::User},
    ports::GroupRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

pub struct PostgresGroupRepo {
    pool: PgPool,
}

impl PostgresGroupRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepo {
    async fn create_with_event(&self, group: &GuestGroup, event_id: &str) -> Result<GuestGroup, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, GuestGroup>(
            "INSERT INTO guest_groups (id, name, created_by, created_at) VALUES ($1, $2, $3, $4) RETURNING *",
        )
            .bind(&group.id)
            .bind(&group.name)
            .bind(&group.created_by)
            .bind(group.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query("INSERT INTO event_guest_groups (event_id, group_id, created_at) VALUES ($1, $2, $3)")
            .bind(event_id)
            .bind(&created.id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<GuestGroup>, AppError> {
        sqlx::query_as::<_, GuestGroup>("SELECT * FROM guest_groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<GuestGroup>, AppError> {
        sqlx::query_as::<_, GuestGroup>(
            "SELECT g.* FROM guest_groups g
             JOIN event_guest_groups egg ON egg.group_id = g.id
             WHERE egg.event_id = $1
             ORDER BY g.created_at ASC",
        )
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn rename(&self, id: &str, name: &str) -> Result<GuestGroup, AppError> {
        sqlx::query_as::<_, GuestGroup>("UPDATE guest_groups SET name = $1 WHERE id = $2 RETURNING *")
            .bind(name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Guest group not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM group_members WHERE group_id = $1").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM event_guest_groups WHERE group_id = $1").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM invite_links WHERE group_id = $1").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM invites WHERE group_id = $1").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;

        // Attendance history survives group deletion.
        sqlx::query("UPDATE guests SET group_id = NULL WHERE group_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let result = sqlx::query("DELETE FROM guest_groups WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Guest group not found".into()));
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn add_member(&self, member: &GroupMember) -> Result<GroupMember, AppError> {
        sqlx::query_as::<_, GroupMember>(
            "INSERT INTO group_members (group_id, user_id, added_by, created_at) VALUES ($1, $2, $3, $4) RETURNING *",
        )
            .bind(&member.group_id)
            .bind(&member.user_id)
            .bind(&member.added_by)
            .bind(member.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn remove_member(&self, group_id: &str, user_id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Member not found in group".into()));
        }

        // Keep the attendance rows, detach the grouping.
        sqlx::query("UPDATE guests SET group_id = NULL WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn is_member(&self, group_id: &str, user_id: &str) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM group_members WHERE group_id = $1 AND user_id = $2)",
        )
            .bind(group_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_members(&self, group_id: &str) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u
             JOIN group_members gm ON gm.user_id = u.id
             WHERE gm.group_id = $1
             ORDER BY u.name ASC",
        )
            .bind(group_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_primary_event(&self, group_id: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>(
            "SELECT e.* FROM events e
             JOIN event_guest_groups egg ON egg.event_id = e.id
             WHERE egg.group_id = $1
             ORDER BY egg.created_at ASC
             LIMIT 1",
        )
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn is_attached(&self, event_id: &str, group_id: &str) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM event_guest_groups WHERE event_id = $1 AND group_id = $2)",
        )
            .bind(event_id)
            .bind(group_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn create_invite_link(&self, link: &InviteLink) -> Result<InviteLink, AppError> {
        sqlx::query_as::<_, InviteLink>(
            "INSERT INTO invite_links (id, group_id, created_by, created_at) VALUES ($1, $2, $3, $4) RETURNING *",
        )
            .bind(&link.id)
            .bind(&link.group_id)
            .bind(&link.created_by)
            .bind(link.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_invite_links(&self, group_id: &str) -> Result<Vec<InviteLink>, AppError> {
        sqlx::query_as::<_, InviteLink>(
            "SELECT * FROM invite_links WHERE group_id = $1 ORDER BY created_at DESC",
        )
            .bind(group_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
