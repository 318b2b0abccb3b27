//! Account database model

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for accounts table
#[derive(Debug, Clone, FromRow)]
pub struct AccountModel {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_ciphertext: String,
    pub mobile_digest: String,
    pub password_hash: String,
    pub gender: String,
    pub profile_pic: Option<String>,
    pub cover_pic: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_deleted: bool,
    pub is_verified: bool,
    pub otp: Option<String>,
    pub otp_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
