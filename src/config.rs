use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub frontend_url: String,
    pub otp_service_url: String,
    pub otp_service_token: String,
    pub storage_service_url: String,
    pub storage_service_token: String,
    pub storage_bucket: String,
    pub jwt_secret_key: String, // Private key (PEM or Base64)
    pub jwt_public_key: String, // Public key (PEM or Base64)
    pub auth_issuer: String,
    pub reconcile_conflict_policy: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string()),
            otp_service_url: env::var("OTP_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8100/api/v1/otp".to_string()),
            otp_service_token: env::var("OTP_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            storage_service_url: env::var("STORAGE_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8200/api/v1/storage".to_string()),
            storage_service_token: env::var("STORAGE_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            storage_bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "profile-images".to_string()),
            jwt_secret_key: env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set (Ed25519 Private Key)"),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").expect("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)"),
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://api.guestlist.local".to_string()),
            reconcile_conflict_policy: env::var("RECONCILE_CONFLICT_POLICY").unwrap_or_else(|_| "linked_wins".to_string()),
        }
    }
}
