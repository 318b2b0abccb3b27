//! Account lifecycle handlers
//!
//! Registration, email verification, login, and the password reset flow.

use axum::{extract::State, Json};
use idp_service::{
    AccountService, ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, ResetPasswordRequest, VerifyCodeRequest,
};

use crate::extractors::ValidatedJson;
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Register a new account
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let service = AccountService::new(state.service_context());
    let response = service.register(request).await?;
    Ok(Created(Json(response)))
}

/// Verify the registration code
///
/// POST /api/auth/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<VerifyCodeRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = AccountService::new(state.service_context());
    let response = service.verify_registration(request).await?;
    Ok(Json(response))
}

/// Login with email and password
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let service = AccountService::new(state.service_context());
    let response = service.login(request).await?;
    Ok(Json(response))
}

/// POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = AccountService::new(state.service_context());
    let response = service.request_password_reset(request).await?;
    Ok(Json(response))
}

/// Check a reset code without consuming it
///
/// POST /api/auth/verify-reset-otp
pub async fn verify_reset_otp(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<VerifyCodeRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = AccountService::new(state.service_context());
    let response = service.confirm_reset_code(request).await?;
    Ok(Json(response))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = AccountService::new(state.service_context());
    let response = service.reset_password(request).await?;
    Ok(Json(response))
}
