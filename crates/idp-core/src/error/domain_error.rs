//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Account not found")]
    AccountNotFound,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid mobile number: {0}")]
    InvalidMobile(String),

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Invalid or expired OTP")]
    InvalidCode,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email or mobile number already exists")]
    AccountAlreadyExists,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::InvalidMobile(_) => "INVALID_MOBILE",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::InvalidCode => "INVALID_CODE",
            Self::AccountAlreadyExists => "ACCOUNT_ALREADY_EXISTS",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::StorageError(_) => "STORAGE_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::AccountNotFound)
    }

    /// Check if this is a validation error (including a rejected one-time code)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidMobile(_) | Self::WeakPassword(_) | Self::InvalidCode
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AccountAlreadyExists)
    }

    pub fn is_invalid_code(&self) -> bool {
        matches!(self, Self::InvalidCode)
    }

    /// Store or file-system failures the caller may retry later
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::StorageError(_))
    }
}
