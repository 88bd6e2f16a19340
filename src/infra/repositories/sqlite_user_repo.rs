use crate::domain::{models::user::{User, VerificationStatus}, ports::UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepo {
    async fn create(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, phone, name, email, dob, gender, profile_pic, preferred_language, verification_status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
            .bind(&user.id)
            .bind(&user.phone)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.dob)
            .bind(&user.gender)
            .bind(&user.profile_pic)
            .bind(&user.preferred_language)
            .bind(user.verification_status)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE phone = ?")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET name = ?, email = ?, dob = ?, gender = ?, profile_pic = ?, preferred_language = ?
             WHERE id = ?
             RETURNING *",
        )
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.dob)
            .bind(&user.gender)
            .bind(&user.profile_pic)
            .bind(&user.preferred_language)
            .bind(&user.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn set_verification_status(&self, id: &str, status: VerificationStatus) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET verification_status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }

    async fn ensure_by_phone(&self, phone: &str) -> Result<User, AppError> {
        if let Some(existing) = self.find_by_phone(phone).await? {
            return Ok(existing);
        }

        let placeholder = User::placeholder(phone.to_string());
        sqlx::query(
            "INSERT INTO users (id, phone, name, email, dob, gender, profile_pic, preferred_language, verification_status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(phone) DO NOTHING",
        )
            .bind(&placeholder.id)
            .bind(&placeholder.phone)
            .bind(&placeholder.name)
            .bind(&placeholder.email)
            .bind(placeholder.dob)
            .bind(&placeholder.gender)
            .bind(&placeholder.profile_pic)
            .bind(&placeholder.preferred_language)
            .bind(placeholder.verification_status)
            .bind(placeholder.created_at)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        // A concurrent insert may have won the race; the re-read is
        // authoritative either way.
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE phone = ?")
            .bind(phone)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
