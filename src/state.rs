use std::sync::Arc;
use crate::domain::ports::{
    AuthRepository, EventRepository, GroupRepository, GuestRepository,
    InviteRepository, ObjectStorage, OtpService, UserRepository,
    VerificationRepository,
};
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::reconciliation::ReconciliationService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub verification_repo: Arc<dyn VerificationRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub group_repo: Arc<dyn GroupRepository>,
    pub guest_repo: Arc<dyn GuestRepository>,
    pub invite_repo: Arc<dyn InviteRepository>,
    pub auth_repo: Arc<dyn AuthRepository>,
    pub auth_service: Arc<AuthService>,
    pub reconciliation: Arc<ReconciliationService>,
    pub otp_service: Arc<dyn OtpService>,
    pub storage: Arc<dyn ObjectStorage>,
}
