use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::models::guest::ConflictPolicy;
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::reconciliation::ReconciliationService;
use crate::infra::otp::http_otp_service::HttpOtpService;
use crate::infra::storage::http_storage_service::HttpStorageService;
use crate::infra::repositories::{
    postgres_user_repo::PostgresUserRepo, postgres_verification_repo::PostgresVerificationRepo,
    postgres_event_repo::PostgresEventRepo, postgres_group_repo::PostgresGroupRepo,
    postgres_guest_repo::PostgresGuestRepo, postgres_invite_repo::PostgresInviteRepo,
    postgres_auth_repo::PostgresAuthRepo,
    sqlite_user_repo::SqliteUserRepo, sqlite_verification_repo::SqliteVerificationRepo,
    sqlite_event_repo::SqliteEventRepo, sqlite_group_repo::SqliteGroupRepo,
    sqlite_guest_repo::SqliteGuestRepo, sqlite_invite_repo::SqliteInviteRepo,
    sqlite_auth_repo::SqliteAuthRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let otp_service = Arc::new(HttpOtpService::new(
        config.otp_service_url.clone(),
        config.otp_service_token.clone(),
    ));

    let storage = Arc::new(HttpStorageService::new(
        config.storage_service_url.clone(),
        config.storage_service_token.clone(),
        config.storage_bucket.clone(),
    ));

    let conflict_policy = ConflictPolicy::from_str(&config.reconcile_conflict_policy)
        .expect("RECONCILE_CONFLICT_POLICY must be linked_wins or unlinked_wins");

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let user_repo = Arc::new(PostgresUserRepo::new(pool.clone()));
        let guest_repo = Arc::new(PostgresGuestRepo::new(pool.clone()));
        let auth_repo = Arc::new(PostgresAuthRepo::new(pool.clone()));
        let auth_service = Arc::new(AuthService::new(auth_repo.clone(), config.clone()));
        let reconciliation = Arc::new(ReconciliationService::new(
            guest_repo.clone(),
            user_repo.clone(),
            conflict_policy,
        ));

        AppState {
            config: config.clone(),
            user_repo,
            verification_repo: Arc::new(PostgresVerificationRepo::new(pool.clone())),
            event_repo: Arc::new(PostgresEventRepo::new(pool.clone())),
            group_repo: Arc::new(PostgresGroupRepo::new(pool.clone())),
            guest_repo,
            invite_repo: Arc::new(PostgresInviteRepo::new(pool.clone())),
            auth_repo,
            auth_service,
            reconciliation,
            otp_service,
            storage,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let user_repo = Arc::new(SqliteUserRepo::new(pool.clone()));
        let guest_repo = Arc::new(SqliteGuestRepo::new(pool.clone()));
        let auth_repo = Arc::new(SqliteAuthRepo::new(pool.clone()));
        let auth_service = Arc::new(AuthService::new(auth_repo.clone(), config.clone()));
        let reconciliation = Arc::new(ReconciliationService::new(
            guest_repo.clone(),
            user_repo.clone(),
            conflict_policy,
        ));

        AppState {
            config: config.clone(),
            user_repo,
            verification_repo: Arc::new(SqliteVerificationRepo::new(pool.clone())),
            event_repo: Arc::new(SqliteEventRepo::new(pool.clone())),
            group_repo: Arc::new(SqliteGroupRepo::new(pool.clone())),
            guest_repo,
            invite_repo: Arc::new(SqliteInviteRepo::new(pool.clone())),
            auth_repo,
            auth_service,
            reconciliation,
            otp_service,
            storage,
        }
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
