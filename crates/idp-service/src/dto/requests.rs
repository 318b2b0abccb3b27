//! Request DTOs for API endpoints
//!
//! All JSON request DTOs implement `Deserialize` and `Validate`. Field names
//! are camelCase on the wire. Email fields are trimmed and lower-cased while
//! deserializing, so validation and lookups see the canonical form.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use validator::Validate;

/// Canonical form of an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn deserialize_email<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_email(&raw))
}

// ============================================================================
// Account Lifecycle Requests
// ============================================================================

/// Account registration request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    pub last_name: String,

    #[serde(deserialize_with = "deserialize_email")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Strength rules are applied by the service
    pub password: String,

    #[validate(length(min = 1, max = 32, message = "Mobile number must be 1-32 characters"))]
    pub mobile_number: String,

    /// `male` or `female`, case-insensitive
    pub gender: String,
}

/// Email plus a one-time code, for registration and reset-code checks
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    #[serde(deserialize_with = "deserialize_email")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Any mismatch, including a malformed value, is an invalid code
    pub otp: String,
}

/// Account login request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(deserialize_with = "deserialize_email")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Password reset request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[serde(deserialize_with = "deserialize_email")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// New password submission, gated by the reset code
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(deserialize_with = "deserialize_email")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub otp: String,

    pub new_password: String,
}

// ============================================================================
// Profile Requests
// ============================================================================

/// Partial profile update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    pub last_name: Option<String>,

    #[validate(length(min = 1, max = 32, message = "Mobile number must be 1-32 characters"))]
    pub mobile_number: Option<String>,

    pub gender: Option<String>,

    /// ISO 8601 calendar date (`YYYY-MM-DD`)
    pub date_of_birth: Option<NaiveDate>,
}

/// A profile picture received from a multipart form
#[derive(Debug, Clone)]
pub struct ProfilePictureUpload {
    pub content_type: Option<String>,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}
