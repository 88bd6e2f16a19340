use crate::domain::{models::event::{Event, EventWithRole}, ports::EventRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepo {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            "INSERT INTO events (id, title, host_id, location, address, invite_message, image, start_at, end_at, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
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
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<EventWithRole>, AppError> {
        sqlx::query_as::<_, EventWithRole>(
            "SELECT e.*,
                    CASE
                        WHEN e.host_id = $1 THEN 'host'
                        WHEN EXISTS(SELECT 1 FROM event_cohosts c WHERE c.event_id = e.id AND c.user_id = $1) THEN 'cohost'
                        ELSE 'guest'
                    END AS user_role
             FROM events e
             WHERE e.host_id = $1
                OR EXISTS(SELECT 1 FROM event_cohosts c WHERE c.event_id = e.id AND c.user_id = $1)
                OR EXISTS(SELECT 1 FROM guests g WHERE g.event_id = e.id AND g.user_id = $1)
             ORDER BY e.created_at DESC",
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            "UPDATE events SET title = $1, location = $2, address = $3, invite_message = $4, image = $5, start_at = $6, end_at = $7
             WHERE id = $8
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

        sqlx::query("DELETE FROM guests WHERE event_id = $1").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM invites WHERE event_id = $1").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM event_guest_groups WHERE event_id = $1").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM event_cohosts WHERE event_id = $1").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;

        let result = sqlx::query("DELETE FROM events WHERE id = $1")
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
            "INSERT INTO event_cohosts (event_id, user_id, created_at) VALUES ($1, $2, $3)
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
        sqlx::query("DELETE FROM event_cohosts WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn is_host_or_cohost(&self, event_id: &str, user_id: &str) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM events WHERE id = $1 AND host_id = $2)
                 OR EXISTS(SELECT 1 FROM event_cohosts WHERE event_id = $1 AND user_id = $2)",
        )
            .bind(event_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
