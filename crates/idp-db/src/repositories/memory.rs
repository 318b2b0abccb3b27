//! In-memory AccountRepository
//!
//! Backs the memory store backend and the service/HTTP test suites. Enforces
//! the same uniqueness rules as the PostgreSQL schema. Every operation takes
//! the lock once and releases it before returning, so nothing is held across
//! an await point.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::instrument;

use idp_core::{Account, AccountId, AccountPatch, AccountRepository, DomainError, RepoResult};

/// HashMap-backed credential store
#[derive(Debug, Default)]
pub struct MemoryAccountRepository {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

fn collides(
    accounts: &HashMap<AccountId, Account>,
    skip: AccountId,
    email: Option<&str>,
    mobile_digest: Option<&str>,
) -> bool {
    accounts.values().any(|other| {
        other.id != skip
            && !other.is_deleted
            && (email.is_some_and(|e| other.email == e)
                || mobile_digest.is_some_and(|d| other.mobile.digest == d))
    })
}

fn patch_in_place(
    accounts: &mut HashMap<AccountId, Account>,
    id: AccountId,
    patch: &AccountPatch,
) -> RepoResult<Account> {
    let digest = patch.mobile.as_ref().map(|m| m.digest.as_str());
    if digest.is_some() && collides(accounts, id, None, digest) {
        return Err(DomainError::AccountAlreadyExists);
    }

    let account = accounts
        .get_mut(&id)
        .filter(|a| !a.is_deleted)
        .ok_or(DomainError::AccountNotFound)?;
    patch.apply_to(account);
    Ok(account.clone())
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    #[instrument(skip(self))]
    async fn find_by_email_or_mobile(
        &self,
        email: &str,
        mobile_digest: &str,
    ) -> RepoResult<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .values()
            .find(|a| !a.is_deleted && (a.email == email || a.mobile.digest == mobile_digest))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .values()
            .find(|a| !a.is_deleted && a.email == email)
            .cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: AccountId) -> RepoResult<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .get(&id)
            .filter(|a| !a.is_deleted)
            .cloned())
    }

    #[instrument(skip(self, account), fields(account_id = %account.id))]
    async fn insert(&self, account: &Account) -> RepoResult<Account> {
        let mut accounts = self.accounts.write();

        if accounts.contains_key(&account.id)
            || collides(
                &accounts,
                account.id,
                Some(&account.email),
                Some(&account.mobile.digest),
            )
        {
            return Err(DomainError::AccountAlreadyExists);
        }

        accounts.insert(account.id, account.clone());
        Ok(account.clone())
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: AccountId, patch: &AccountPatch) -> RepoResult<Account> {
        patch_in_place(&mut self.accounts.write(), id, patch)
    }

    #[instrument(skip(self, code, patch))]
    async fn update_if_code_matches(
        &self,
        id: AccountId,
        code: &str,
        now: DateTime<Utc>,
        patch: &AccountPatch,
    ) -> RepoResult<Option<Account>> {
        let mut accounts = self.accounts.write();

        let matches = accounts
            .get(&id)
            .is_some_and(|a| !a.is_deleted && a.code_matches(code, now));
        if !matches {
            return Ok(None);
        }

        patch_in_place(&mut accounts, id, patch).map(Some)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: AccountId) -> RepoResult<bool> {
        Ok(self.accounts.write().remove(&id).is_some())
    }

    async fn health_check(&self) -> RepoResult<()> {
        Ok(())
    }
}
