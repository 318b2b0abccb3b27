//! Profile handlers
//!
//! Bearer-authenticated operations on the caller's own account.

use axum::{extract::State, Json};
use idp_service::{AccountResponse, MessageResponse, ProfileService, UpdateProfileRequest};

use crate::extractors::{AuthAccount, ProfilePicForm, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Update profile fields
///
/// PUT /api/auth/update-profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthAccount,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<Json<AccountResponse>> {
    let service = ProfileService::new(state.service_context());
    let response = service.update_profile(&auth.subject, request).await?;
    Ok(Json(response))
}

/// Upload a profile picture (multipart field `profilePic`)
///
/// POST /api/auth/upload-profile-pic
pub async fn upload_profile_pic(
    State(state): State<AppState>,
    auth: AuthAccount,
    ProfilePicForm(upload): ProfilePicForm,
) -> ApiResult<Json<AccountResponse>> {
    let service = ProfileService::new(state.service_context());
    let response = service.upload_profile_picture(&auth.subject, upload).await?;
    Ok(Json(response))
}

/// DELETE /api/auth/delete-account
pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthAccount,
) -> ApiResult<Json<MessageResponse>> {
    let service = ProfileService::new(state.service_context());
    let response = service.delete_account(&auth.subject).await?;
    Ok(Json(response))
}
