use crate::domain::{models::event::{Event, EventWithRole}, ports::EventRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct SqliteEventRepo {
    pool: SqlitePool,
}

impl SqliteEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepo {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            "INSERT INTO events (id, title, host_id, location, address, invite_message, image, start_at, end_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
            .bind(&event.id)
            .bind(&event.title)
            .bind(&event.host_id)
            .bind(&event.location)
            .bind(&event.address)
            .bind(&event.invite_message)
            .bind(&event.image)
            .bind(event.start_at)
            .bind(event.end_at)
            .bind(event.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<EventWithRole>, AppError> {
        sqlx::query_as::<_, EventWithRole>(
            "SELECT e.*,
                    CASE
                        WHEN e.host_id = ? THEN 'host'
                        WHEN EXISTS(SELECT 1 FROM event_cohosts c WHERE c.event_id = e.id AND c.user_id = ?) THEN 'cohost'
                        ELSE 'guest'
                    END AS user_role
             FROM events e
             WHERE e.host_id = ?
                OR EXISTS(SELECT 1 FROM event_cohosts c WHERE c.event_id = e.id AND c.user_id = ?)
                OR EXISTS(SELECT 1 FROM guests g WHERE g.event_id = e.id AND g.user_id = ?)
             ORDER BY e.created_at DESC",
        )
            .bind(user_id)
            .bind(user_id)
            .bind(user_id)
            .bind(user_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            "UPDATE events SET title = ?, location = ?, address = ?, invite_message = ?, image = ?, start_at = ?, end_at = ?
             WHERE id = ?
             RETURNING *",
        )
            .bind(&event.title)
            .bind(&event.location)
            .bind(&event.address)
            .bind(&event.invite_message)
            .bind(&event.image)
            .bind(event.start_at)
            .bind(event.end_at)
            .bind(&event.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM guests WHERE event_id = ?").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM invites WHERE event_id = ?").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM event_guest_groups WHERE event_id = ?").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM event_cohosts WHERE event_id = ?").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;

        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn add_cohost(&self, event_id: &str, user_id: &str) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO event_cohosts (event_id, user_id, created_at) VALUES (?, ?, ?)
             ON CONFLICT DO NOTHING",
        )
            .bind(event_id)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn remove_cohost(&self, event_id: &str, user_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM event_cohosts WHERE event_id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn is_host_or_cohost(&self, event_id: &str, user_id: &str) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM events WHERE id = ? AND host_id = ?)
                 OR EXISTS(SELECT 1 FROM event_cohosts WHERE event_id = ? AND user_id = ?)",
        )
            .bind(event_id)
            .bind(user_id)
            .bind(event_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
