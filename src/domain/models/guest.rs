use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rsvp {
    NoResponse,
    Accepted,
    Declined,
    Maybe,
    FailedDelivery,
}

impl Rsvp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rsvp::NoResponse => "no_response",
            Rsvp::Accepted => "accepted",
            Rsvp::Declined => "declined",
            Rsvp::Maybe => "maybe",
            Rsvp::FailedDelivery => "failed_delivery",
        }
    }
}

impl FromStr for Rsvp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_response" => Ok(Rsvp::NoResponse),
            "accepted" => Ok(Rsvp::Accepted),
            "declined" => Ok(Rsvp::Declined),
            "maybe" => Ok(Rsvp::Maybe),
            "failed_delivery" => Ok(Rsvp::FailedDelivery),
            other => Err(format!("unknown rsvp value: {}", other)),
        }
    }
}

// Stored as TEXT on every backend, like the other status columns.
impl<DB: sqlx::Database> sqlx::Type<DB> for Rsvp
where
    str: sqlx::Type<DB>,
{
    fn type_info() -> DB::TypeInfo {
        <str as sqlx::Type<DB>>::type_info()
    }

    fn compatible(ty: &DB::TypeInfo) -> bool {
        <str as sqlx::Type<DB>>::compatible(ty)
    }
}

impl<'q, DB: sqlx::Database> sqlx::Encode<'q, DB> for Rsvp
where
    &'q str: sqlx::Encode<'q, DB>,
{
    fn encode_by_ref(
        &self,
        buf: &mut <DB as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<'q, DB>>::encode(self.as_str(), buf)
    }
}

impl<'r, DB: sqlx::Database> sqlx::Decode<'r, DB> for Rsvp
where
    &'r str: sqlx::Decode<'r, DB>,
{
    fn decode(
        value: <DB as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let value = <&str as sqlx::Decode<'r, DB>>::decode(value)?;
        value.parse().map_err(|e: String| e.into())
    }
}

/// Who a guest row belongs to: a registered account, or raw contact details
/// captured from the public web form. A row is always exactly one of the two.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum GuestIdentity {
    Linked {
        user_id: String,
    },
    Unlinked {
        name: String,
        phone: String,
        email: Option<String>,
    },
}

impl GuestIdentity {
    pub fn from_columns(
        user_id: Option<String>,
        name: Option<String>,
        phone: Option<String>,
        email: Option<String>,
    ) -> Result<Self, String> {
        match (user_id, name, phone) {
            (Some(user_id), None, None) => Ok(GuestIdentity::Linked { user_id }),
            (None, Some(name), Some(phone)) => Ok(GuestIdentity::Unlinked { name, phone, email }),
            _ => Err("guest row is neither linked nor unlinked".to_string()),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct Guest {
    pub id: String,
    pub event_id: String,
    pub group_id: Option<String>,
    #[serde(flatten)]
    pub identity: GuestIdentity,
    pub rsvp: Rsvp,
    pub food: Option<String>,
    pub alcohol: Option<String>,
    pub accommodation: Option<String>,
    pub count: i32,
    pub created_at: DateTime<Utc>,
}

impl Guest {
    pub fn new_linked(event_id: String, group_id: Option<String>, user_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            group_id,
            identity: GuestIdentity::Linked { user_id },
            rsvp: Rsvp::NoResponse,
            food: None,
            alcohol: None,
            accommodation: None,
            count: 1,
            created_at: Utc::now(),
        }
    }

    pub fn new_unlinked(
        event_id: String,
        group_id: Option<String>,
        name: String,
        phone: String,
        email: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            group_id,
            identity: GuestIdentity::Unlinked { name, phone, email },
            rsvp: Rsvp::NoResponse,
            food: None,
            alcohol: None,
            accommodation: None,
            count: 1,
            created_at: Utc::now(),
        }
    }

    pub fn is_linked(&self) -> bool {
        matches!(self.identity, GuestIdentity::Linked { .. })
    }

    pub fn user_id(&self) -> Option<&str> {
        match &self.identity {
            GuestIdentity::Linked { user_id } => Some(user_id),
            GuestIdentity::Unlinked { .. } => None,
        }
    }

    pub fn contact_name(&self) -> Option<&str> {
        match &self.identity {
            GuestIdentity::Unlinked { name, .. } => Some(name),
            GuestIdentity::Linked { .. } => None,
        }
    }

    pub fn contact_phone(&self) -> Option<&str> {
        match &self.identity {
            GuestIdentity::Unlinked { phone, .. } => Some(phone),
            GuestIdentity::Linked { .. } => None,
        }
    }

    pub fn contact_email(&self) -> Option<&str> {
        match &self.identity {
            GuestIdentity::Unlinked { email, .. } => email.as_deref(),
            GuestIdentity::Linked { .. } => None,
        }
    }
}

macro_rules! impl_guest_from_row {
    ($row:ty) => {
        impl<'r> FromRow<'r, $row> for Guest {
            fn from_row(row: &'r $row) -> Result<Self, sqlx::Error> {
                use sqlx::Row;

                let identity = GuestIdentity::from_columns(
                    row.try_get("user_id")?,
                    row.try_get("name")?,
                    row.try_get("phone")?,
                    row.try_get("email")?,
                )
                .map_err(|e| sqlx::Error::ColumnDecode {
                    index: "user_id".to_string(),
                    source: e.into(),
                })?;

                Ok(Guest {
                    id: row.try_get("id")?,
                    event_id: row.try_get("event_id")?,
                    group_id: row.try_get("group_id")?,
                    identity,
                    rsvp: row.try_get("rsvp")?,
                    food: row.try_get("food")?,
                    alcohol: row.try_get("alcohol")?,
                    accommodation: row.try_get("accommodation")?,
                    count: row.try_get("count")?,
                    created_at: row.try_get("created_at")?,
                })
            }
        }
    };
}

impl_guest_from_row!(sqlx::sqlite::SqliteRow);
impl_guest_from_row!(sqlx::postgres::PgRow);

/// Preference payload shared by both RSVP channels.
#[derive(Debug, Clone)]
pub struct RsvpSubmission {
    pub rsvp: Rsvp,
    pub food: Option<String>,
    pub alcohol: Option<String>,
    pub accommodation: Option<String>,
    pub count: Option<i32>,
}

impl Guest {
    pub fn apply_submission(&mut self, submission: &RsvpSubmission) {
        self.rsvp = submission.rsvp;
        if let Some(food) = &submission.food {
            self.food = Some(food.clone());
        }
        if let Some(alcohol) = &submission.alcohol {
            self.alcohol = Some(alcohol.clone());
        }
        if let Some(accommodation) = &submission.accommodation {
            self.accommodation = Some(accommodation.clone());
        }
        if let Some(count) = submission.count {
            self.count = count;
        }
    }
}

/// Everything the authenticated RSVP path may touch in one transaction:
/// the guest row itself plus refreshed contact details on the user record.
pub struct AuthenticatedRsvpParams {
    pub user_id: String,
    pub event_id: String,
    pub group_id: String,
    pub submission: RsvpSubmission,
    pub new_name: Option<String>,
    pub new_email: Option<String>,
}

/// How the linking pass resolves an unlinked row whose event already has a
/// linked row for the same user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// The app-side record is authoritative; the web duplicate is dropped.
    LinkedWins,
    /// The web record's response and preferences overwrite the linked row
    /// before the duplicate is dropped.
    UnlinkedWins,
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linked_wins" => Ok(ConflictPolicy::LinkedWins),
            "unlinked_wins" => Ok(ConflictPolicy::UnlinkedWins),
            other => Err(format!("unknown conflict policy: {}", other)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GuestListFilter {
    pub rsvp: Option<Rsvp>,
    pub food: Option<String>,
    pub alcohol: Option<String>,
    pub accommodation: Option<String>,
    pub group_id: Option<String>,
    pub include_unlinked: Option<bool>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct RsvpSummaryRow {
    pub rsvp: Rsvp,
    pub food: Option<String>,
    pub alcohol: Option<String>,
    pub accommodation: Option<String>,
    pub guests: i64,
    pub confirmed: i64,
}

#[derive(Debug, Serialize)]
pub struct RsvpSummary {
    pub rows: Vec<RsvpSummaryRow>,
    pub total_invited: i64,
    pub total_confirmed: i64,
}

/// A guest row joined with the event it belongs to, for the "my RSVPs" view.
#[derive(Debug, Serialize, FromRow)]
pub struct UserRsvp {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub guest: Guest,
    pub event_title: String,
    pub event_start_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_rejects_both_and_neither() {
        assert!(GuestIdentity::from_columns(None, None, None, None).is_err());
        assert!(GuestIdentity::from_columns(
            Some("u1".into()),
            Some("Ada".into()),
            Some("+1555".into()),
            None
        )
        .is_err());
    }

    #[test]
    fn identity_accepts_exactly_one_side() {
        let linked = GuestIdentity::from_columns(Some("u1".into()), None, None, None).unwrap();
        assert_eq!(linked, GuestIdentity::Linked { user_id: "u1".into() });

        let unlinked =
            GuestIdentity::from_columns(None, Some("Ada".into()), Some("+1555".into()), None)
                .unwrap();
        assert!(matches!(unlinked, GuestIdentity::Unlinked { .. }));
    }
}
