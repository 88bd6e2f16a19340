use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Unverified,
    Verified,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Unverified => "unverified",
            VerificationStatus::Verified => "verified",
        }
    }
}

impl FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unverified" => Ok(VerificationStatus::Unverified),
            "verified" => Ok(VerificationStatus::Verified),
            other => Err(format!("unknown verification status: {}", other)),
        }
    }
}

// Stored as TEXT on every backend, like the other status columns.
impl<DB: sqlx::Database> sqlx::Type<DB> for VerificationStatus
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

impl<'q, DB: sqlx::Database> sqlx::Encode<'q, DB> for VerificationStatus
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

impl<'r, DB: sqlx::Database> sqlx::Decode<'r, DB> for VerificationStatus
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

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub phone: String,
    pub name: String,
    pub email: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub profile_pic: Option<String>,
    pub preferred_language: Option<String>,
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
}

pub struct NewUserParams {
    pub phone: String,
    pub name: String,
    pub email: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub profile_pic: Option<String>,
    pub preferred_language: Option<String>,
    pub verification_status: VerificationStatus,
}

impl User {
    pub fn new(params: NewUserParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            phone: params.phone,
            name: params.name,
            email: params.email,
            dob: params.dob,
            gender: params.gender,
            profile_pic: params.profile_pic,
            preferred_language: params.preferred_language,
            verification_status: params.verification_status,
            created_at: Utc::now(),
        }
    }

    /// Placeholder identity for a phone number that has never onboarded.
    /// The display name defaults to the phone number until the owner claims
    /// the account.
    pub fn placeholder(phone: String) -> Self {
        let name = phone.clone();
        Self::new(NewUserParams {
            phone,
            name,
            email: None,
            dob: None,
            gender: None,
            profile_pic: None,
            preferred_language: None,
            verification_status: VerificationStatus::Unverified,
        })
    }

    pub fn is_verified(&self) -> bool {
        self.verification_status == VerificationStatus::Verified
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct VerifiedPhone {
    pub phone: String,
    pub verified_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl VerifiedPhone {
    pub fn new(phone: String) -> Self {
        Self {
            phone,
            verified_at: Utc::now(),
            consumed_at: None,
        }
    }
}
