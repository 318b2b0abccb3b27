//! # idp-service
//!
//! Application layer: the account lifecycle engine, profile operations,
//! and the DTOs exchanged with the transport layer.

pub mod dto;
pub mod services;
pub mod storage;

pub use dto::{
    AccountResponse, ForgotPasswordRequest, HealthChecks, HealthResponse, LoginRequest,
    LoginResponse, MessageResponse, ProfilePictureUpload, ReadinessResponse, RegisterRequest,
    ResetPasswordRequest, UpdateProfileRequest, VerifyCodeRequest,
};
pub use services::{
    AccountService, ProfileService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, ServiceSettings,
};
pub use storage::LocalFileStore;
