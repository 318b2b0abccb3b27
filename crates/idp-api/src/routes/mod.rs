//! Route definitions
//!
//! Account routes are mounted under /api/auth; health probes sit at the root.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{auth, health, profile};
use crate::state::AppState;

/// Multipart framing on top of the largest accepted picture
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the main API router (excluding health for separate middleware handling)
pub fn create_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().nest("/api/auth", auth_routes(max_upload_bytes))
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// Account lifecycle and profile routes
fn auth_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // Registration and login
        .route("/register", post(auth::register))
        .route("/verify-otp", post(auth::verify_otp))
        .route("/login", post(auth::login))
        // Password reset
        .route("/forgot-password", post(auth::forgot_password))
        .route("/verify-reset-otp", post(auth::verify_reset_otp))
        .route("/reset-password", post(auth::reset_password))
        // Authenticated profile operations
        .route("/update-profile", put(profile::update_profile))
        .route(
            "/upload-profile-pic",
            post(profile::upload_profile_pic)
                .layer(DefaultBodyLimit::max(
                    max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
                )),
        )
        .route("/delete-account", delete(profile::delete_account))
}
