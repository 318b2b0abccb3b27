//! Profile service
//!
//! Operations on the authenticated caller's own account: partial profile
//! updates, profile pictures, and account deletion.

use idp_core::{Account, AccountId, AccountPatch, Gender};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::dto::{AccountResponse, MessageResponse, ProfilePictureUpload, UpdateProfileRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub const ACCOUNT_DELETED_MESSAGE: &str = "Account deleted successfully.";

/// Profile service
pub struct ProfileService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ProfileService<'a> {
    /// Create a new ProfileService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Apply a partial update to name, mobile number, gender, or date of birth
    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        subject: &str,
        request: UpdateProfileRequest,
    ) -> ServiceResult<AccountResponse> {
        let id = parse_subject(subject)?;

        let mut patch = AccountPatch {
            first_name: request.first_name,
            last_name: request.last_name,
            date_of_birth: request.date_of_birth,
            ..AccountPatch::default()
        };
        if let Some(raw) = request.mobile_number.as_deref() {
            patch.mobile = Some(self.ctx.mobile_cipher().protect(raw)?);
        }
        if let Some(raw) = request.gender.as_deref() {
            patch.gender = Some(raw.parse::<Gender>().map_err(ServiceError::validation)?);
        }

        if patch.is_empty() {
            let account = self.find_by_id(id).await?;
            return self.ctx.account_view(&account);
        }

        let account = self
            .ctx
            .store("update", self.ctx.account_repo().update(id, &patch))
            .await?;

        info!(account_id = %id, "Profile updated");
        self.ctx.account_view(&account)
    }

    /// Store a new profile picture and point the account at it
    #[instrument(skip(self, upload), fields(size = upload.bytes.len()))]
    pub async fn upload_profile_picture(
        &self,
        subject: &str,
        upload: ProfilePictureUpload,
    ) -> ServiceResult<AccountResponse> {
        let id = parse_subject(subject)?;
        let extension = self.check_upload(&upload)?;
        let account = self.find_by_id(id).await?;

        let key = format!("profile/{id}/{}.{extension}", Uuid::new_v4());
        let stored = self
            .ctx
            .store("put_file", self.ctx.file_store().put(&key, &upload.bytes))
            .await?;

        let patch = AccountPatch {
            profile_pic: Some(stored.reference.clone()),
            ..AccountPatch::default()
        };
        let updated = match self
            .ctx
            .store("update", self.ctx.account_repo().update(id, &patch))
            .await
        {
            Ok(updated) => updated,
            Err(err) => {
                self.remove_file(&stored.reference).await;
                return Err(err);
            }
        };

        if let Some(previous) = account.profile_pic.as_deref() {
            if previous != stored.reference {
                self.remove_file(previous).await;
            }
        }

        info!(account_id = %id, reference = %stored.reference, size = stored.size, "Profile picture stored");
        self.ctx.account_view(&updated)
    }

    /// Permanently remove the account
    #[instrument(skip(self))]
    pub async fn delete_account(&self, subject: &str) -> ServiceResult<MessageResponse> {
        let id = parse_subject(subject)?;
        let account = self.find_by_id(id).await?;

        let removed = self
            .ctx
            .store("delete", self.ctx.account_repo().delete(id))
            .await?;
        if !removed {
            return Err(ServiceError::not_found("Account", id.to_string()));
        }

        if let Some(picture) = account.profile_pic.as_deref() {
            self.remove_file(picture).await;
        }

        info!(account_id = %id, "Account deleted");
        Ok(MessageResponse::new(ACCOUNT_DELETED_MESSAGE))
    }

    async fn find_by_id(&self, id: AccountId) -> ServiceResult<Account> {
        self.ctx
            .store("find_by_id", self.ctx.account_repo().find_by_id(id))
            .await?
            .ok_or_else(|| ServiceError::not_found("Account", id.to_string()))
    }

    /// Validate an upload, returning the file extension to store it under
    fn check_upload(&self, upload: &ProfilePictureUpload) -> ServiceResult<String> {
        if upload.bytes.is_empty() {
            return Err(ServiceError::invalid_request("Uploaded file is empty"));
        }

        let max = self.ctx.settings().max_upload_bytes;
        if upload.bytes.len() > max {
            return Err(ServiceError::invalid_request(format!(
                "File exceeds the maximum size of {max} bytes"
            )));
        }

        let subtype = upload
            .content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .and_then(|ct| ct.strip_prefix("image/").map(str::to_string))
            .ok_or_else(|| ServiceError::invalid_request("Only image uploads are accepted"))?;

        Ok(image_extension(&subtype, upload.file_name.as_deref()))
    }

    /// Best effort; an orphaned file is logged and left behind
    async fn remove_file(&self, reference: &str) {
        if let Err(err) = self
            .ctx
            .store("remove_file", self.ctx.file_store().remove(reference))
            .await
        {
            warn!(reference, error = %err, "Failed to remove stored file");
        }
    }
}

fn parse_subject(subject: &str) -> ServiceResult<AccountId> {
    if subject.trim().is_empty() {
        return Err(ServiceError::invalid_request("Account id is required"));
    }
    subject
        .parse()
        .map_err(|_| ServiceError::invalid_request("Malformed account id"))
}

fn image_extension(subtype: &str, file_name: Option<&str>) -> String {
    let from_subtype = match subtype {
        "jpeg" | "pjpeg" => Some("jpg".to_string()),
        "svg+xml" => Some("svg".to_string()),
        other if !other.is_empty() && other.chars().all(|c| c.is_ascii_alphanumeric()) => {
            Some(other.to_string())
        }
        _ => None,
    };

    from_subtype
        .or_else(|| {
            file_name
                .and_then(|name| name.rsplit_once('.'))
                .map(|(_, ext)| ext.to_ascii_lowercase())
                .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        })
        .unwrap_or_else(|| "img".to_string())
}
