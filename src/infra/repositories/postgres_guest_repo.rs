use crate::domain::{
    models::guest::{
        AuthenticatedRsvpParams, ConflictPolicy, Guest, GuestListFilter, Rsvp, RsvpSummary,
        RsvpSummaryRow, UserRsvp,
    },
    ports::GuestRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

pub struct PostgresGuestRepo {
    pool: PgPool,
}

impl PostgresGuestRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuestRepository for PostgresGuestRepo {
    async fn attach_group_to_event(&self, event_id: &str, group_id: &str, member_ids: &[String]) -> Result<Vec<Guest>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query(
            "INSERT INTO event_guest_groups (event_id, group_id, created_at) VALUES ($1, $2, $3)
             ON CONFLICT DO NOTHING",
        )
            .bind(event_id)
            .bind(group_id)
            .bind(chrono::Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let mut created = Vec::new();
        for user_id in member_ids {
            let guest = Guest::new_linked(event_id.to_string(), Some(group_id.to_string()), user_id.clone());

            // Members that already hold a row for this event are skipped at
            // the constraint level, so re-attaching never duplicates.
            let inserted = sqlx::query_as::<_, Guest>(
                "INSERT INTO guests (id, event_id, group_id, user_id, name, phone, email, rsvp, food, alcohol, accommodation, count, created_at)
                 VALUES ($1, $2, $3, $4, NULL, NULL, NULL, $5, NULL, NULL, NULL, $6, $7)
                 ON CONFLICT DO NOTHING
                 RETURNING *",
            )
                .bind(&guest.id)
                .bind(&guest.event_id)
                .bind(&guest.group_id)
                .bind(user_id)
                .bind(guest.rsvp)
                .bind(guest.count)
                .bind(guest.created_at)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            if let Some(guest) = inserted {
                created.push(guest);
            }
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_user_and_event(&self, user_id: &str, event_id: &str) -> Result<Option<Guest>, AppError> {
        sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE user_id = $1 AND event_id = $2")
            .bind(user_id)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_unlinked(&self, event_id: &str, group_id: &str, phone: &str) -> Result<Option<Guest>, AppError> {
        sqlx::query_as::<_, Guest>(
            "SELECT * FROM guests WHERE user_id IS NULL AND event_id = $1 AND group_id = $2 AND phone = $3",
        )
            .bind(event_id)
            .bind(group_id)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn create_unlinked(&self, guest: &Guest) -> Result<Guest, AppError> {
        sqlx::query_as::<_, Guest>(
            "INSERT INTO guests (id, event_id, group_id, user_id, name, phone, email, rsvp, food, alcohol, accommodation, count, created_at)
             VALUES ($1, $2, $3, NULL, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING *",
        )
            .bind(&guest.id)
            .bind(&guest.event_id)
            .bind(&guest.group_id)
            .bind(guest.contact_name())
            .bind(guest.contact_phone())
            .bind(guest.contact_email())
            .bind(guest.rsvp)
            .bind(&guest.food)
            .bind(&guest.alcohol)
            .bind(&guest.accommodation)
            .bind(guest.count)
            .bind(guest.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn submit_authenticated(&self, params: &AuthenticatedRsvpParams) -> Result<(Guest, bool), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        if params.new_name.is_some() || params.new_email.is_some() {
            sqlx::query("UPDATE users SET name = COALESCE($1, name), email = COALESCE($2, email) WHERE id = $3")
                .bind(&params.new_name)
                .bind(&params.new_email)
                .bind(&params.user_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        let existing = sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE user_id = $1 AND event_id = $2")
            .bind(&params.user_id)
            .bind(&params.event_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let (guest, updated) = match existing {
            Some(existing) => {
                let updated = sqlx::query_as::<_, Guest>(
                    "UPDATE guests SET rsvp = $1, group_id = $2,
                            food = COALESCE($3, food),
                            alcohol = COALESCE($4, alcohol),
                            accommodation = COALESCE($5, accommodation),
                            count = COALESCE($6, count)
                     WHERE id = $7
                     RETURNING *",
                )
                    .bind(params.submission.rsvp)
                    .bind(&params.group_id)
                    .bind(&params.submission.food)
                    .bind(&params.submission.alcohol)
                    .bind(&params.submission.accommodation)
                    .bind(params.submission.count)
                    .bind(&existing.id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(AppError::Database)?;
                (updated, true)
            }
            None => {
                let mut guest = Guest::new_linked(
                    params.event_id.clone(),
                    Some(params.group_id.clone()),
                    params.user_id.clone(),
                );
                guest.apply_submission(&params.submission);

                let inserted = sqlx::query_as::<_, Guest>(
                    "INSERT INTO guests (id, event_id, group_id, user_id, name, phone, email, rsvp, food, alcohol, accommodation, count, created_at)
                     VALUES ($1, $2, $3, $4, NULL, NULL, NULL, $5, $6, $7, $8, $9, $10)
                     RETURNING *",
                )
                    .bind(&guest.id)
                    .bind(&guest.event_id)
                    .bind(&guest.group_id)
                    .bind(&params.user_id)
                    .bind(guest.rsvp)
                    .bind(&guest.food)
                    .bind(&guest.alcohol)
                    .bind(&guest.accommodation)
                    .bind(guest.count)
                    .bind(guest.created_at)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(AppError::Database)?;
                (inserted, false)
            }
        };

        tx.commit().await.map_err(AppError::Database)?;
        Ok((guest, updated))
    }

    async fn upsert_rsvp(&self, user_id: &str, event_id: &str, rsvp: Rsvp) -> Result<Guest, AppError> {
        let guest = Guest::new_linked(event_id.to_string(), None, user_id.to_string());
        sqlx::query_as::<_, Guest>(
            "INSERT INTO guests (id, event_id, group_id, user_id, name, phone, email, rsvp, food, alcohol, accommodation, count, created_at)
             VALUES ($1, $2, NULL, $3, NULL, NULL, NULL, $4, NULL, NULL, NULL, $5, $6)
             ON CONFLICT (event_id, user_id) WHERE user_id IS NOT NULL DO UPDATE SET rsvp = excluded.rsvp
             RETURNING *",
        )
            .bind(&guest.id)
            .bind(event_id)
            .bind(user_id)
            .bind(rsvp)
            .bind(guest.count)
            .bind(guest.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn cancel_rsvp(&self, user_id: &str, event_id: &str) -> Result<Guest, AppError> {
        sqlx::query_as::<_, Guest>(
            "UPDATE guests SET rsvp = $1 WHERE user_id = $2 AND event_id = $3 RETURNING *",
        )
            .bind(Rsvp::NoResponse)
            .bind(user_id)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("No RSVP found for this event".into()))
    }

    async fn link_rsvps(&self, user_id: &str, phone: &str, policy: ConflictPolicy) -> Result<Vec<Guest>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let candidates = sqlx::query_as::<_, Guest>(
            "SELECT * FROM guests WHERE user_id IS NULL AND phone = $1 ORDER BY created_at ASC",
        )
            .bind(phone)
            .fetch_all(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let mut linked = Vec::new();
        for candidate in candidates {
            let existing = sqlx::query_as::<_, Guest>(
                "SELECT * FROM guests WHERE user_id = $1 AND event_id = $2",
            )
                .bind(user_id)
                .bind(&candidate.event_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            match existing {
                Some(existing) => {
                    // The user already holds a linked row for this event;
                    // the unlinked one is a duplicate and must not survive.
                    if policy == ConflictPolicy::UnlinkedWins {
                        sqlx::query(
                            "UPDATE guests SET rsvp = $1, food = $2, alcohol = $3, accommodation = $4, count = $5 WHERE id = $6",
                        )
                            .bind(candidate.rsvp)
                            .bind(&candidate.food)
                            .bind(&candidate.alcohol)
                            .bind(&candidate.accommodation)
                            .bind(candidate.count)
                            .bind(&existing.id)
                            .execute(&mut *tx)
                            .await
                            .map_err(AppError::Database)?;
                    }

                    sqlx::query("DELETE FROM guests WHERE id = $1")
                        .bind(&candidate.id)
                        .execute(&mut *tx)
                        .await
                        .map_err(AppError::Database)?;
                }
                None => {
                    let converted = sqlx::query_as::<_, Guest>(
                        "UPDATE guests SET user_id = $1, name = NULL, phone = NULL, email = NULL
                         WHERE id = $2
                         RETURNING *",
                    )
                        .bind(user_id)
                        .bind(&candidate.id)
                        .fetch_one(&mut *tx)
                        .await
                        .map_err(AppError::Database)?;
                    linked.push(converted);
                }
            }
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(linked)
    }

    async fn list_by_event(&self, event_id: &str, filter: &GuestListFilter) -> Result<Vec<Guest>, AppError> {
        let mut sql = String::from("SELECT * FROM guests WHERE event_id = $1");
        let mut next_param = 2;

        if filter.rsvp.is_some() {
            sql.push_str(&format!(" AND rsvp = ${}", next_param));
            next_param += 1;
        }
        if filter.food.is_some() {
            sql.push_str(&format!(" AND food = ${}", next_param));
            next_param += 1;
        }
        if filter.alcohol.is_some() {
            sql.push_str(&format!(" AND alcohol = ${}", next_param));
            next_param += 1;
        }
        if filter.accommodation.is_some() {
            sql.push_str(&format!(" AND accommodation = ${}", next_param));
            next_param += 1;
        }
        if filter.group_id.is_some() {
            sql.push_str(&format!(" AND group_id = ${}", next_param));
        }
        if filter.include_unlinked == Some(false) {
            sql.push_str(" AND user_id IS NOT NULL");
        }
        sql.push_str(" ORDER BY created_at ASC");

        let mut query = sqlx::query_as::<_, Guest>(&sql).bind(event_id);
        if let Some(rsvp) = filter.rsvp {
            query = query.bind(rsvp);
        }
        if let Some(food) = &filter.food {
            query = query.bind(food);
        }
        if let Some(alcohol) = &filter.alcohol {
            query = query.bind(alcohol);
        }
        if let Some(accommodation) = &filter.accommodation {
            query = query.bind(accommodation);
        }
        if let Some(group_id) = &filter.group_id {
            query = query.bind(group_id);
        }

        query.fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_user_rsvps(&self, user_id: &str) -> Result<Vec<UserRsvp>, AppError> {
        sqlx::query_as::<_, UserRsvp>(
            "SELECT g.*, e.title AS event_title, e.start_at AS event_start_at
             FROM guests g
             JOIN events e ON e.id = g.event_id
             WHERE g.user_id = $1 AND g.rsvp != $2
             ORDER BY e.start_at ASC",
        )
            .bind(user_id)
            .bind(Rsvp::NoResponse)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn rsvp_summary(&self, event_id: &str) -> Result<RsvpSummary, AppError> {
        let rows = sqlx::query_as::<_, RsvpSummaryRow>(
            "SELECT rsvp, food, alcohol, accommodation, COUNT(*) AS guests, COALESCE(SUM(count), 0) AS confirmed
             FROM guests WHERE event_id = $1
             GROUP BY rsvp, food, alcohol, accommodation",
        )
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let totals = sqlx::query(
            "SELECT COUNT(*) AS total_invited, COALESCE(SUM(count), 0) AS total_confirmed
             FROM guests WHERE event_id = $1",
        )
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(RsvpSummary {
            rows,
            total_invited: totals.get::<i64, _>("total_invited"),
            total_confirmed: totals.get::<i64, _>("total_confirmed"),
        })
    }
}
