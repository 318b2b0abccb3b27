//! # idp-common
//!
//! Shared utilities including configuration, error handling, session tokens,
//! password hashing, mobile-number encryption, and telemetry.

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    hash_password, validate_password_strength, verify_password, Claims, JwtService,
    PasswordService, SessionToken,
};
pub use config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, EncryptionConfig,
    Environment, JwtConfig, MailConfig, MailProvider, OtpConfig, RateLimitConfig, ServerConfig,
    StorageConfig, StoreBackend, StoreConfig,
};
pub use crypto::{normalize_mobile, MobileCipher};
pub use error::{domain_status, AppError, AppResult, ErrorResponse};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
