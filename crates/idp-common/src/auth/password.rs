//! Password hashing and verification utilities
//!
//! Uses Argon2id with a random salt per hash. Stored values are PHC strings
//! and never equal the plaintext.

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use idp_core::DomainError;

use crate::error::AppError;

const MIN_PASSWORD_LEN: usize = 6;
const MAX_PASSWORD_LEN: usize = 72;

/// Stands in for the stored hash when no account matches a login
static ABSENT_ACCOUNT_HASH: OnceLock<String> = OnceLock::new();

fn absent_account_hash() -> Result<&'static str, AppError> {
    if let Some(hash) = ABSENT_ACCOUNT_HASH.get() {
        return Ok(hash);
    }
    let hash = hash_password("absent-account")?;
    Ok(ABSENT_ACCOUNT_HASH.get_or_init(|| hash))
}

/// Hash a password using Argon2id
///
/// # Errors
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))
}

/// Verify a password against a hash
///
/// # Errors
/// Returns an error if the stored hash is not a valid PHC string
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Password hashing off the async executor.
///
/// Argon2 is CPU-bound; both operations run on the blocking thread pool so
/// request tasks keep making progress.
#[derive(Debug, Clone, Default)]
pub struct PasswordService;

impl PasswordService {
    /// Create a new password service
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Hash a password
    ///
    /// # Errors
    /// Returns an error if hashing fails or the blocking task panics
    pub async fn hash(&self, password: String) -> Result<String, AppError> {
        tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing task failed: {e}")))?
    }

    /// Verify a password against a hash
    ///
    /// # Errors
    /// Returns an error if the hash is malformed or the blocking task panics
    pub async fn verify(&self, password: String, hash: String) -> Result<bool, AppError> {
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Verification task failed: {e}")))?
    }

    /// Run one full verification for a login that matched no account, so
    /// the miss costs the same Argon2 work as a wrong password.
    ///
    /// # Errors
    /// Returns an error if the placeholder hash cannot be built or the task panics
    pub async fn verify_absent(&self, password: String) -> Result<(), AppError> {
        tokio::task::spawn_blocking(move || {
            let hash = absent_account_hash()?;
            verify_password(&password, hash).map(|_| ())
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Verification task failed: {e}")))?
    }
}

/// Validate password strength
///
/// Returns `Ok(())` if the password:
/// - is 6 to 72 characters long
/// - contains at least one letter
/// - contains at least one digit
///
/// # Errors
/// Returns `DomainError::WeakPassword` if the password doesn't meet requirements
pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(weak(format!(
            "Password must be {MIN_PASSWORD_LEN}-{MAX_PASSWORD_LEN} characters long"
        )));
    }

    if !password.chars().any(char::is_alphabetic) {
        return Err(weak("Password must contain at least one letter"));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(weak("Password must contain at least one digit"));
    }

    Ok(())
}

fn weak(reason: impl Into<String>) -> AppError {
    AppError::Domain(DomainError::WeakPassword(reason.into()))
}
