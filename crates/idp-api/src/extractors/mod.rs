//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validated JSON, and file uploads.

mod auth;
mod upload;
mod validated;

pub use auth::AuthAccount;
pub use upload::{ProfilePicForm, PROFILE_PIC_FIELD};
pub use validated::ValidatedJson;
