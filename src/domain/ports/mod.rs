use crate::domain::models::{
    auth::RefreshTokenRecord,
    event::{Event, EventWithRole},
    group::{GroupMember, GuestGroup, InviteLink},
    guest::{
        AuthenticatedRsvpParams, ConflictPolicy, Guest, GuestListFilter, Rsvp, RsvpSummary,
        UserRsvp,
    },
    invite::Invite,
    user::{User, VerificationStatus, VerifiedPhone},
};
use crate::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError>;
    async fn update(&self, user: &User) -> Result<User, AppError>;
    async fn set_verification_status(&self, id: &str, status: VerificationStatus) -> Result<(), AppError>;
    /// Create-or-fetch of a placeholder account for a phone number. Safe to
    /// race: the unique constraint on phone arbitrates, losers re-read.
    async fn ensure_by_phone(&self, phone: &str) -> Result<User, AppError>;
}

#[async_trait]
pub trait VerificationRepository: Send + Sync {
    async fn record(&self, phone: &str) -> Result<(), AppError>;
    async fn find(&self, phone: &str) -> Result<Option<VerifiedPhone>, AppError>;
    async fn consume(&self, phone: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<EventWithRole>, AppError>;
    async fn update(&self, event: &Event) -> Result<Event, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn add_cohost(&self, event_id: &str, user_id: &str) -> Result<(), AppError>;
    async fn remove_cohost(&self, event_id: &str, user_id: &str) -> Result<(), AppError>;
    async fn is_host_or_cohost(&self, event_id: &str, user_id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create_with_event(&self, group: &GuestGroup, event_id: &str) -> Result<GuestGroup, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<GuestGroup>, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<GuestGroup>, AppError>;
    async fn rename(&self, id: &str, name: &str) -> Result<GuestGroup, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn add_member(&self, member: &GroupMember) -> Result<GroupMember, AppError>;
    async fn remove_member(&self, group_id: &str, user_id: &str) -> Result<(), AppError>;
    async fn is_member(&self, group_id: &str, user_id: &str) -> Result<bool, AppError>;
    async fn list_members(&self, group_id: &str) -> Result<Vec<User>, AppError>;
    async fn find_primary_event(&self, group_id: &str) -> Result<Option<Event>, AppError>;
    async fn is_attached(&self, event_id: &str, group_id: &str) -> Result<bool, AppError>;
    async fn create_invite_link(&self, link: &InviteLink) -> Result<InviteLink, AppError>;
    async fn list_invite_links(&self, group_id: &str) -> Result<Vec<InviteLink>, AppError>;
}

#[async_trait]
pub trait GuestRepository: Send + Sync {
    /// Associates the group with the event and seeds one linked no_response
    /// row per member, skipping members that already have a row for the
    /// event. Returns only the rows actually created.
    async fn attach_group_to_event(&self, event_id: &str, group_id: &str, member_ids: &[String]) -> Result<Vec<Guest>, AppError>;
    async fn find_by_user_and_event(&self, user_id: &str, event_id: &str) -> Result<Option<Guest>, AppError>;
    async fn find_unlinked(&self, event_id: &str, group_id: &str, phone: &str) -> Result<Option<Guest>, AppError>;
    async fn create_unlinked(&self, guest: &Guest) -> Result<Guest, AppError>;
    /// Update-in-place (re-tagging the group) or insert for the
    /// authenticated channel; refreshed user contact details land in the
    /// same transaction. Returns the row and whether it was an update.
    async fn submit_authenticated(&self, params: &AuthenticatedRsvpParams) -> Result<(Guest, bool), AppError>;
    async fn upsert_rsvp(&self, user_id: &str, event_id: &str, rsvp: Rsvp) -> Result<Guest, AppError>;
    async fn cancel_rsvp(&self, user_id: &str, event_id: &str) -> Result<Guest, AppError>;
    /// The reconciliation pass (one transaction): every unlinked row for
    /// the phone is either converted to a linked row or resolved against a
    /// pre-existing linked row for the same event per the policy. Returns
    /// the newly linked rows.
    async fn link_rsvps(&self, user_id: &str, phone: &str, policy: ConflictPolicy) -> Result<Vec<Guest>, AppError>;
    async fn list_by_event(&self, event_id: &str, filter: &GuestListFilter) -> Result<Vec<Guest>, AppError>;
    async fn list_user_rsvps(&self, user_id: &str) -> Result<Vec<UserRsvp>, AppError>;
    async fn rsvp_summary(&self, event_id: &str) -> Result<RsvpSummary, AppError>;
}

#[async_trait]
pub trait InviteRepository: Send + Sync {
    async fn create(&self, invite: &Invite) -> Result<Invite, AppError>;
    async fn find_by_phone_and_event(&self, phone: &str, event_id: &str) -> Result<Option<Invite>, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Invite>, AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait OtpService: Send + Sync {
    async fn send(&self, phone: &str) -> Result<(), AppError>;
    async fn verify(&self, phone: &str, code: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, data: &[u8], key: &str) -> Result<String, AppError>;
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}
