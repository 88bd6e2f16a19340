use std::sync::Arc;
use crate::domain::models::guest::{ConflictPolicy, Guest};
use crate::domain::models::user::{User, VerificationStatus};
use crate::domain::ports::{GuestRepository, UserRepository};
use crate::error::AppError;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct LinkOutcome {
    pub linked_count: usize,
    pub linked: Vec<Guest>,
    pub message: String,
}

/// Folds a phone number's anonymous RSVP history into its verified account.
/// Runs whenever a phone transitions to an addressable user: OTP
/// verification of an existing account, or onboarding completion.
pub struct ReconciliationService {
    guest_repo: Arc<dyn GuestRepository>,
    user_repo: Arc<dyn UserRepository>,
    policy: ConflictPolicy,
}

impl ReconciliationService {
    pub fn new(
        guest_repo: Arc<dyn GuestRepository>,
        user_repo: Arc<dyn UserRepository>,
        policy: ConflictPolicy,
    ) -> Self {
        Self { guest_repo, user_repo, policy }
    }

    /// Promote the account to verified if it is not already, then run the
    /// linking pass. Both entry paths (placeholder user verifying later,
    /// fresh onboarding) converge here.
    pub async fn verify_and_link(&self, user: &User) -> Result<LinkOutcome, AppError> {
        if user.verification_status != VerificationStatus::Verified {
            self.user_repo
                .set_verification_status(&user.id, VerificationStatus::Verified)
                .await?;
        }
        self.link_rsvps(user).await
    }

    pub async fn link_rsvps(&self, user: &User) -> Result<LinkOutcome, AppError> {
        let linked = self
            .guest_repo
            .link_rsvps(&user.id, &user.phone, self.policy)
            .await?;

        let message = if linked.is_empty() {
            "No previous RSVPs found".to_string()
        } else {
            format!("Linked {} previous RSVP(s) to your account", linked.len())
        };

        info!(
            user_id = %user.id,
            linked_count = linked.len(),
            "Reconciliation pass completed"
        );

        Ok(LinkOutcome {
            linked_count: linked.len(),
            linked,
            message,
        })
    }
}
