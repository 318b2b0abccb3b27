//! Multipart profile-picture extractor

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
};
use idp_service::ProfilePictureUpload;

use crate::response::ApiError;

/// Form field carrying the picture
pub const PROFILE_PIC_FIELD: &str = "profilePic";

/// The `profilePic` part of a multipart form. Other parts are ignored.
#[derive(Debug)]
pub struct ProfilePicForm(pub ProfilePictureUpload);

#[async_trait]
impl<S> FromRequest<S> for ProfilePicForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::invalid_body(e.body_text()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::invalid_body(e.body_text()))?
        {
            if field.name() != Some(PROFILE_PIC_FIELD) {
                continue;
            }

            let content_type = field.content_type().map(str::to_string);
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::invalid_body(e.body_text()))?;

            return Ok(ProfilePicForm(ProfilePictureUpload {
                content_type,
                file_name,
                bytes: bytes.to_vec(),
            }));
        }

        Err(ApiError::invalid_body(format!(
            "Missing `{PROFILE_PIC_FIELD}` file field"
        )))
    }
}
