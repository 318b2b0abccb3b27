//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Account, AccountPatch};
use crate::error::DomainError;
use crate::value_objects::AccountId;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Account Repository
// ============================================================================

/// Credential store.
///
/// Implementations enforce uniqueness of `email` and of the mobile lookup
/// digest among non-deleted accounts, and report violations as
/// [`DomainError::AccountAlreadyExists`].
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account whose email OR mobile digest matches
    async fn find_by_email_or_mobile(
        &self,
        email: &str,
        mobile_digest: &str,
    ) -> RepoResult<Option<Account>>;

    /// Find account by (normalized) email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Account>>;

    /// Find account by ID
    async fn find_by_id(&self, id: AccountId) -> RepoResult<Option<Account>>;

    /// Persist a new account
    async fn insert(&self, account: &Account) -> RepoResult<Account>;

    /// Apply a partial update, returning the stored result.
    ///
    /// Fails with [`DomainError::AccountNotFound`] if no record matches.
    async fn update(&self, id: AccountId, patch: &AccountPatch) -> RepoResult<Account>;

    /// Apply `patch` only if the stored code equals `code` and has not
    /// expired at `now`, as one atomic step.
    ///
    /// Returns `Ok(None)` when the guard fails, so two concurrent
    /// submissions of the same code cannot both succeed.
    async fn update_if_code_matches(
        &self,
        id: AccountId,
        code: &str,
        now: DateTime<Utc>,
        patch: &AccountPatch,
    ) -> RepoResult<Option<Account>>;

    /// Permanently remove an account. Returns whether a record was removed.
    async fn delete(&self, id: AccountId) -> RepoResult<bool>;

    /// Cheap connectivity probe for readiness checks
    async fn health_check(&self) -> RepoResult<()>;
}
