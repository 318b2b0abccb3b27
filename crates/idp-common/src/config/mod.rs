//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, EncryptionConfig,
    Environment, JwtConfig, MailConfig, MailProvider, OtpConfig, RateLimitConfig, ServerConfig,
    StorageConfig, StoreBackend, StoreConfig,
};
