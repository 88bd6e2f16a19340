use crate::domain::{models::user::VerifiedPhone, ports::VerificationRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

pub struct PostgresVerificationRepo {
    pool: PgPool,
}

impl PostgresVerificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationRepository for PostgresVerificationRepo {
    async fn record(&self, phone: &str) -> Result<(), AppError> {
        let entry = VerifiedPhone::new(phone.to_string());
        sqlx::query(
            "INSERT INTO verified_phones (phone, verified_at, consumed_at) VALUES ($1, $2, NULL)
             ON CONFLICT (phone) DO UPDATE SET verified_at = excluded.verified_at",
        )
            .bind(&entry.phone)
            .bind(entry.verified_at)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn find(&self, phone: &str) -> Result<Option<VerifiedPhone>, AppError> {
        sqlx::query_as::<_, VerifiedPhone>("SELECT * FROM verified_phones WHERE phone = $1")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn consume(&self, phone: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE verified_phones SET consumed_at = $1 WHERE phone = $2")
            .bind(Utc::now())
            .bind(phone)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}
