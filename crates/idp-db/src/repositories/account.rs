//! PostgreSQL implementation of AccountRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use idp_core::{Account, AccountId, AccountPatch, AccountRepository, DomainError, RepoResult};

use crate::mappers::{AccountInsert, PatchColumns};
use crate::models::AccountModel;

use super::error::{account_exists, map_db_error, map_unique_violation};

/// Single conditional UPDATE shared by plain and code-guarded updates.
///
/// `$14` is the guard code (NULL for an unconditional update); when set, the
/// row only changes if it still holds that code and `$15 <= otp_expires`.
const UPDATE_SQL: &str = r"
    UPDATE accounts
    SET first_name        = COALESCE($2, first_name),
        last_name         = COALESCE($3, last_name),
        mobile_ciphertext = COALESCE($4, mobile_ciphertext),
        mobile_digest     = COALESCE($5, mobile_digest),
        gender            = COALESCE($6, gender),
        date_of_birth     = COALESCE($7, date_of_birth),
        profile_pic       = COALESCE($8, profile_pic),
        password_hash     = COALESCE($9, password_hash),
        is_verified       = COALESCE($10, is_verified),
        otp = CASE $11::text
                WHEN 'issue' THEN $12::text
                WHEN 'clear' THEN NULL
                ELSE otp
              END,
        otp_expires = CASE $11::text
                WHEN 'issue' THEN $13::timestamptz
                WHEN 'clear' THEN NULL
                ELSE otp_expires
              END,
        updated_at = NOW()
    WHERE id = $1
      AND NOT is_deleted
      AND ($14::text IS NULL OR (otp = $14::text AND otp_expires >= $15::timestamptz))
    RETURNING id, first_name, last_name, email, mobile_ciphertext, mobile_digest,
              password_hash, gender, profile_pic, cover_pic, date_of_birth,
              is_deleted, is_verified, otp, otp_expires, created_at, updated_at
";

/// PostgreSQL implementation of AccountRepository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    /// Create a new PgAccountRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn apply_patch(
        &self,
        id: AccountId,
        patch: &AccountPatch,
        guard: Option<(&str, DateTime<Utc>)>,
    ) -> RepoResult<Option<Account>> {
        let cols = PatchColumns::new(patch);
        let (guard_code, guard_now) = match guard {
            Some((code, now)) => (Some(code), Some(now)),
            None => (None, None),
        };

        let result = sqlx::query_as::<_, AccountModel>(UPDATE_SQL)
            .bind(id.into_inner())
            .bind(cols.first_name)
            .bind(cols.last_name)
            .bind(cols.mobile_ciphertext)
            .bind(cols.mobile_digest)
            .bind(cols.gender)
            .bind(cols.date_of_birth)
            .bind(cols.profile_pic)
            .bind(cols.password_hash)
            .bind(cols.is_verified)
            .bind(cols.code_action)
            .bind(cols.otp)
            .bind(cols.otp_expires)
            .bind(guard_code)
            .bind(guard_now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, account_exists))?;

        result.map(Account::try_from).transpose()
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    #[instrument(skip(self))]
    async fn find_by_email_or_mobile(
        &self,
        email: &str,
        mobile_digest: &str,
    ) -> RepoResult<Option<Account>> {
        let result = sqlx::query_as::<_, AccountModel>(
            r"
            SELECT id, first_name, last_name, email, mobile_ciphertext, mobile_digest,
                   password_hash, gender, profile_pic, cover_pic, date_of_birth,
                   is_deleted, is_verified, otp, otp_expires, created_at, updated_at
            FROM accounts
            WHERE (email = $1 OR mobile_digest = $2) AND NOT is_deleted
            LIMIT 1
            ",
        )
        .bind(email)
        .bind(mobile_digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Account::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        let result = sqlx::query_as::<_, AccountModel>(
            r"
            SELECT id, first_name, last_name, email, mobile_ciphertext, mobile_digest,
                   password_hash, gender, profile_pic, cover_pic, date_of_birth,
                   is_deleted, is_verified, otp, otp_expires, created_at, updated_at
            FROM accounts
            WHERE email = $1 AND NOT is_deleted
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Account::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: AccountId) -> RepoResult<Option<Account>> {
        let result = sqlx::query_as::<_, AccountModel>(
            r"
            SELECT id, first_name, last_name, email, mobile_ciphertext, mobile_digest,
                   password_hash, gender, profile_pic, cover_pic, date_of_birth,
                   is_deleted, is_verified, otp, otp_expires, created_at, updated_at
            FROM accounts
            WHERE id = $1 AND NOT is_deleted
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Account::try_from).transpose()
    }

    #[instrument(skip(self, account), fields(account_id = %account.id))]
    async fn insert(&self, account: &Account) -> RepoResult<Account> {
        let row = AccountInsert::new(account);

        let result = sqlx::query_as::<_, AccountModel>(
            r"
            INSERT INTO accounts (id, first_name, last_name, email, mobile_ciphertext,
                                  mobile_digest, password_hash, gender, is_verified,
                                  otp, otp_expires, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, first_name, last_name, email, mobile_ciphertext, mobile_digest,
                      password_hash, gender, profile_pic, cover_pic, date_of_birth,
                      is_deleted, is_verified, otp, otp_expires, created_at, updated_at
            ",
        )
        .bind(row.id)
        .bind(row.first_name)
        .bind(row.last_name)
        .bind(row.email)
        .bind(row.mobile_ciphertext)
        .bind(row.mobile_digest)
        .bind(row.password_hash)
        .bind(row.gender)
        .bind(row.is_verified)
        .bind(row.otp)
        .bind(row.otp_expires)
        .bind(row.created_at)
        .bind(row.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, account_exists))?;

        Account::try_from(result)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: AccountId, patch: &AccountPatch) -> RepoResult<Account> {
        self.apply_patch(id, patch, None)
            .await?
            .ok_or(DomainError::AccountNotFound)
    }

    #[instrument(skip(self, code, patch))]
    async fn update_if_code_matches(
        &self,
        id: AccountId,
        code: &str,
        now: DateTime<Utc>,
        patch: &AccountPatch,
    ) -> RepoResult<Option<Account>> {
        self.apply_patch(id, patch, Some((code, now))).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: AccountId) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM accounts WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}
