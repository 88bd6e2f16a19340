use guestlist_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    infra::repositories::{
        sqlite_user_repo::SqliteUserRepo,
        sqlite_verification_repo::SqliteVerificationRepo,
        sqlite_event_repo::SqliteEventRepo,
        sqlite_group_repo::SqliteGroupRepo,
        sqlite_guest_repo::SqliteGuestRepo,
        sqlite_invite_repo::SqliteInviteRepo,
        sqlite_auth_repo::SqliteAuthRepo,
    },
    domain::models::guest::ConflictPolicy,
    domain::ports::{ObjectStorage, OtpService},
    domain::services::auth_service::AuthService,
    domain::services::reconciliation::ReconciliationService,
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, header},
    Router,
};
use async_trait::async_trait;
use tower::ServiceExt;
use serde_json::{json, Value};

/// Approves exactly one code so tests can exercise both outcomes.
pub const TEST_OTP_CODE: &str = "123456";

pub struct MockOtpService;

#[async_trait]
impl OtpService for MockOtpService {
    async fn send(&self, _phone: &str) -> Result<(), AppError> {
        Ok(())
    }

    async fn verify(&self, _phone: &str, code: &str) -> Result<bool, AppError> {
        Ok(code == TEST_OTP_CODE)
    }
}

pub struct MockStorage;

#[async_trait]
impl ObjectStorage for MockStorage {
    async fn upload(&self, _data: &[u8], key: &str) -> Result<String, AppError> {
        Ok(format!("http://storage.local/mock/{}", key))
    }

    async fn delete(&self, _key: &str) -> Result<(), AppError> {
        Ok(())
    }
}

pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_policy(ConflictPolicy::LinkedWins).await
    }

    pub async fn with_policy(policy: ConflictPolicy) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            frontend_url: "http://localhost:5173".to_string(),
            otp_service_url: "http://localhost".to_string(),
            otp_service_token: "token".to_string(),
            storage_service_url: "http://localhost".to_string(),
            storage_service_token: "token".to_string(),
            storage_bucket: "test-bucket".to_string(),
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            reconcile_conflict_policy: "linked_wins".to_string(),
        };

        let user_repo = Arc::new(SqliteUserRepo::new(pool.clone()));
        let guest_repo = Arc::new(SqliteGuestRepo::new(pool.clone()));
        let auth_repo = Arc::new(SqliteAuthRepo::new(pool.clone()));
        let auth_service = Arc::new(AuthService::new(auth_repo.clone(), config.clone()));
        let reconciliation = Arc::new(ReconciliationService::new(
            guest_repo.clone(),
            user_repo.clone(),
            policy,
        ));

        let state = Arc::new(AppState {
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
            otp_service: Arc::new(MockOtpService),
            storage: Arc::new(MockStorage),
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    /// OTP-verify a phone that already has an account, returning the auth
    /// headers and the response body (which carries the reconciliation
    /// outcome).
    pub async fn login(&self, phone: &str) -> (AuthHeaders, Value) {
        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/otp/verify")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "phone": phone, "code": TEST_OTP_CODE }).to_string()))
                .unwrap()
        ).await.unwrap();

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        Self::extract_auth(response).await
    }

    /// Full first-time flow: OTP verification followed by onboarding.
    pub async fn onboard(&self, phone: &str, name: &str) -> (AuthHeaders, Value) {
        let verify = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/otp/verify")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "phone": phone, "code": TEST_OTP_CODE }).to_string()))
                .unwrap()
        ).await.unwrap();

        if !verify.status().is_success() {
            panic!("OTP verify failed in test helper: status {}", verify.status());
        }

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/onboard")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "phone": phone, "name": name }).to_string()))
                .unwrap()
        ).await.unwrap();

        if !response.status().is_success() {
            panic!("Onboarding failed in test helper: status {}", response.status());
        }

        Self::extract_auth(response).await
    }

    async fn extract_auth(response: axum::response::Response) -> (AuthHeaders, Value) {
        let cookies: Vec<String> = response.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|h| h.to_str().unwrap().to_string())
            .collect();

        let access_token_cookie = cookies.iter()
            .find(|c| c.contains("access_token="))
            .expect("No access_token cookie returned");

        let start = access_token_cookie.find("access_token=").unwrap() + 13;
        let end = access_token_cookie[start..].find(';').unwrap_or(access_token_cookie.len() - start);
        let access_token = access_token_cookie[start..start + end].to_string();

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body_json: Value = serde_json::from_slice(&body_bytes).unwrap();
        let csrf_token = body_json["csrf_token"].as_str().expect("No csrf_token in body").to_string();

        (AuthHeaders { access_token, csrf_token }, body_json)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
