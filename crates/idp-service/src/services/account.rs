//! Account lifecycle service
//!
//! Handles registration, email verification, login, and the password reset
//! flow. Every one-time code is consumed through the store's conditional
//! update, so a code can be redeemed at most once.

use chrono::Utc;
use idp_common::validate_password_strength;
use idp_core::{
    Account, AccountId, AccountPatch, Gender, NewAccount, Notification, OneTimeCode,
};
use tracing::{info, instrument, warn};

use crate::dto::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    ResetPasswordRequest, VerifyCodeRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub const REGISTERED_MESSAGE: &str =
    "User registered successfully. Please verify OTP sent to your email.";
pub const VERIFIED_MESSAGE: &str = "OTP verified successfully. Your account is now active.";
pub const RESET_REQUESTED_MESSAGE: &str = "Password reset code sent to your email.";
pub const RESET_CODE_CONFIRMED_MESSAGE: &str = "OTP verified. You can now reset your password.";
pub const PASSWORD_RESET_MESSAGE: &str = "Password reset successfully.";

/// Account lifecycle service
pub struct AccountService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccountService<'a> {
    /// Create a new AccountService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new, unverified account and send its verification code
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<MessageResponse> {
        validate_password_strength(&request.password)?;

        let gender: Gender = request.gender.parse().map_err(ServiceError::validation)?;
        let mobile = self.ctx.mobile_cipher().protect(&request.mobile_number)?;

        let existing = self
            .ctx
            .store(
                "find_by_email_or_mobile",
                self.ctx
                    .account_repo()
                    .find_by_email_or_mobile(&request.email, &mobile.digest),
            )
            .await?;
        if let Some(existing) = existing {
            warn!(account_id = %existing.id, "Registration rejected: email or mobile already in use");
            return Err(ServiceError::conflict("Email or mobile number already exists"));
        }

        let password_hash = self.ctx.password_service().hash(request.password).await?;
        let code = OneTimeCode::generate(self.ctx.settings().otp_ttl);
        let notification = Notification::registration_code(&request.email, code.value());

        let account = Account::new(
            AccountId::generate(),
            NewAccount {
                first_name: request.first_name,
                last_name: request.last_name,
                email: request.email,
                mobile,
                password_hash,
                gender,
            },
            code,
        );

        let account = self
            .ctx
            .store("insert", self.ctx.account_repo().insert(&account))
            .await?;

        info!(account_id = %account.id, "Account registered");

        let delivered = self.ctx.notify(&notification).await;
        Ok(MessageResponse::with_delivery(REGISTERED_MESSAGE, delivered))
    }

    /// Confirm email ownership with the registration code
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn verify_registration(
        &self,
        request: VerifyCodeRequest,
    ) -> ServiceResult<MessageResponse> {
        let account = self.find_by_email(&request.email).await?;
        let now = Utc::now();

        if !account.code_matches(&request.otp, now) {
            warn!(account_id = %account.id, "Registration code rejected");
            return Err(ServiceError::invalid_code());
        }

        self.consume_code(&account, &request.otp, now, AccountPatch::verified())
            .await?;

        info!(account_id = %account.id, "Account verified");
        Ok(MessageResponse::new(VERIFIED_MESSAGE))
    }

    /// Exchange email and password for a session token.
    ///
    /// Unknown email, unverified account, and wrong password all yield the
    /// same `InvalidCredentials` error.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        let found = self
            .ctx
            .store(
                "find_by_email",
                self.ctx.account_repo().find_by_email(&request.email),
            )
            .await?;

        let account = match found {
            Some(account) => account,
            None => {
                self.ctx
                    .password_service()
                    .verify_absent(request.password)
                    .await?;
                warn!("Login failed: account not found");
                return Err(ServiceError::invalid_credentials());
            }
        };

        let password_ok = self
            .ctx
            .password_service()
            .verify(request.password, account.password_hash.clone())
            .await?;

        if !password_ok {
            warn!(account_id = %account.id, "Login failed: invalid password");
            return Err(ServiceError::invalid_credentials());
        }

        if !account.can_authenticate() {
            warn!(account_id = %account.id, "Login failed: account not verified");
            return Err(ServiceError::invalid_credentials());
        }

        let session = self.ctx.jwt_service().issue(account.id)?;
        let view = self.ctx.account_view(&account)?;

        info!(account_id = %account.id, "Account logged in");
        Ok(LoginResponse::new(session, view))
    }

    /// Issue a fresh reset code, replacing any current code
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn request_password_reset(
        &self,
        request: ForgotPasswordRequest,
    ) -> ServiceResult<MessageResponse> {
        let account = self.find_by_email(&request.email).await?;

        let code = OneTimeCode::generate(self.ctx.settings().otp_ttl);
        let notification = Notification::reset_code(&account.email, code.value());

        self.ctx
            .store(
                "update",
                self.ctx
                    .account_repo()
                    .update(account.id, &AccountPatch::issue_code(code)),
            )
            .await?;

        info!(account_id = %account.id, "Password reset code issued");

        let delivered = self.ctx.notify(&notification).await;
        Ok(MessageResponse::with_delivery(RESET_REQUESTED_MESSAGE, delivered))
    }

    /// Check a reset code without consuming it
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn confirm_reset_code(
        &self,
        request: VerifyCodeRequest,
    ) -> ServiceResult<MessageResponse> {
        let account = self.find_by_email(&request.email).await?;

        if !account.code_matches(&request.otp, Utc::now()) {
            warn!(account_id = %account.id, "Reset code rejected");
            return Err(ServiceError::invalid_code());
        }

        Ok(MessageResponse::new(RESET_CODE_CONFIRMED_MESSAGE))
    }

    /// Set a new password, consuming the reset code
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn reset_password(
        &self,
        request: ResetPasswordRequest,
    ) -> ServiceResult<MessageResponse> {
        let account = self.find_by_email(&request.email).await?;

        if !account.code_matches(&request.otp, Utc::now()) {
            warn!(account_id = %account.id, "Reset code rejected");
            return Err(ServiceError::invalid_code());
        }

        validate_password_strength(&request.new_password)?;
        let password_hash = self
            .ctx
            .password_service()
            .hash(request.new_password)
            .await?;

        // Hashing takes a while; re-check expiry at commit time
        self.consume_code(
            &account,
            &request.otp,
            Utc::now(),
            AccountPatch::password_reset(password_hash),
        )
        .await?;

        info!(account_id = %account.id, "Password reset");
        Ok(MessageResponse::new(PASSWORD_RESET_MESSAGE))
    }

    async fn find_by_email(&self, email: &str) -> ServiceResult<Account> {
        self.ctx
            .store("find_by_email", self.ctx.account_repo().find_by_email(email))
            .await?
            .ok_or_else(|| ServiceError::not_found("Account", email))
    }

    /// Commit `patch` only if `code` is still the current, unexpired code
    async fn consume_code(
        &self,
        account: &Account,
        code: &str,
        now: chrono::DateTime<Utc>,
        patch: AccountPatch,
    ) -> ServiceResult<Account> {
        self.ctx
            .store(
                "update_if_code_matches",
                self.ctx
                    .account_repo()
                    .update_if_code_matches(account.id, code, now, &patch),
            )
            .await?
            .ok_or_else(|| {
                warn!(account_id = %account.id, "Code was consumed or replaced concurrently");
                ServiceError::invalid_code()
            })
    }
}
