//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).
//! Built once at startup and handed to every component explicitly.

use std::env;
use std::fmt;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub store: StoreConfig,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub otp: OtpConfig,
    pub encryption: EncryptionConfig,
    pub mail: MailConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which credential store implementation to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(other.to_string()),
        }
    }
}

/// Credential store settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Upper bound on a single store call, in seconds
    pub timeout_secs: u64,
}

/// Database configuration
#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .finish_non_exhaustive()
    }
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Session token lifetime in seconds
    pub session_token_expiry: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("session_token_expiry", &self.session_token_expiry)
            .finish_non_exhaustive()
    }
}

/// One-time code settings
#[derive(Debug, Clone)]
pub struct OtpConfig {
    pub ttl_secs: i64,
}

/// Secret keying mobile-number encryption and lookup digests
#[derive(Clone)]
pub struct EncryptionConfig {
    pub mobile_secret: String,
}

impl fmt::Debug for EncryptionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionConfig").finish_non_exhaustive()
    }
}

/// Outbound mail transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailProvider {
    /// Log notifications instead of sending them
    #[default]
    Log,
    /// JSON transactional-email HTTP API
    Http,
}

impl FromStr for MailProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "http" | "api" => Ok(Self::Http),
            other => Err(other.to_string()),
        }
    }
}

/// Outbound mail configuration
#[derive(Clone)]
pub struct MailConfig {
    pub provider: MailProvider,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub sender_email: Option<String>,
    pub sender_name: String,
    /// Shown in message headings and footers
    pub product_name: String,
    /// Upper bound on a single dispatch, in seconds
    pub timeout_secs: u64,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("sender_email", &self.sender_email)
            .field("sender_name", &self.sender_name)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// File storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: String,
    pub max_file_size_mb: u32,
}

/// Largest accepted `MAX_FILE_SIZE_MB`
pub const MAX_FILE_SIZE_MB_LIMIT: u32 = 1024;

impl StorageConfig {
    /// Upload limit in bytes, saturating where `usize` is too narrow
    #[must_use]
    pub fn max_file_size_bytes(&self) -> usize {
        usize::try_from(self.max_file_size_mb)
            .ok()
            .and_then(|mb| mb.checked_mul(1 << 20))
            .unwrap_or(usize::MAX)
    }
}

// Default value functions
fn default_app_name() -> String {
    "identity-server".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_session_token_expiry() -> i64 {
    604_800 // 7 days
}

fn default_otp_ttl() -> i64 {
    600 // 10 minutes
}

fn default_store_timeout() -> u64 {
    5
}

fn default_dispatch_timeout() -> u64 {
    10
}

fn default_product_name() -> String {
    "Volunteer App".to_string()
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_max_file_size() -> u32 {
    5
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns an error if required values are missing or invalid
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = Lookup(&get);

        let env = match lookup.text("APP_ENV") {
            None => Environment::default(),
            Some(s) => match s.to_lowercase().as_str() {
                "production" => Environment::Production,
                "staging" => Environment::Staging,
                "development" => Environment::Development,
                _ => return Err(ConfigError::InvalidValue("APP_ENV", s)),
            },
        };

        let backend: StoreBackend = lookup.parsed("STORE_BACKEND", StoreBackend::default())?;

        let database = match lookup.text("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: lookup
                    .parsed("DATABASE_MAX_CONNECTIONS", default_max_connections())?,
                min_connections: lookup
                    .parsed("DATABASE_MIN_CONNECTIONS", default_min_connections())?,
            }),
            None if backend == StoreBackend::Postgres => {
                return Err(ConfigError::MissingVar("DATABASE_URL"))
            }
            None => None,
        };

        let provider: MailProvider = lookup.parsed("MAIL_PROVIDER", MailProvider::default())?;
        let mail = MailConfig {
            provider,
            api_url: lookup.text("MAIL_API_URL"),
            api_key: lookup.text("MAIL_API_KEY"),
            sender_email: lookup.text("MAIL_SENDER_EMAIL"),
            sender_name: lookup
                .text("MAIL_SENDER_NAME")
                .unwrap_or_else(default_product_name),
            product_name: lookup
                .text("MAIL_PRODUCT_NAME")
                .unwrap_or_else(default_product_name),
            timeout_secs: lookup.parsed("DISPATCH_TIMEOUT_SECS", default_dispatch_timeout())?,
        };
        if mail.provider == MailProvider::Http {
            if mail.api_url.is_none() {
                return Err(ConfigError::MissingVar("MAIL_API_URL"));
            }
            if mail.api_key.is_none() {
                return Err(ConfigError::MissingVar("MAIL_API_KEY"));
            }
            if mail.sender_email.is_none() {
                return Err(ConfigError::MissingVar("MAIL_SENDER_EMAIL"));
            }
        }

        let otp_ttl: i64 = lookup.parsed("OTP_TTL_SECONDS", default_otp_ttl())?;
        if otp_ttl <= 0 {
            return Err(ConfigError::InvalidValue(
                "OTP_TTL_SECONDS",
                otp_ttl.to_string(),
            ));
        }

        let max_file_size_mb: u32 =
            lookup.parsed("MAX_FILE_SIZE_MB", default_max_file_size())?;
        if max_file_size_mb == 0 || max_file_size_mb > MAX_FILE_SIZE_MB_LIMIT {
            return Err(ConfigError::InvalidValue(
                "MAX_FILE_SIZE_MB",
                max_file_size_mb.to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup.text("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            api: ServerConfig {
                host: lookup.text("API_HOST").unwrap_or_else(default_host),
                port: lookup.parsed("API_PORT", default_port())?,
            },
            store: StoreConfig {
                backend,
                timeout_secs: lookup.parsed("STORE_TIMEOUT_SECS", default_store_timeout())?,
            },
            database,
            jwt: JwtConfig {
                secret: lookup.required("JWT_SECRET")?,
                session_token_expiry: lookup
                    .parsed("JWT_SESSION_TOKEN_EXPIRY", default_session_token_expiry())?,
            },
            otp: OtpConfig { ttl_secs: otp_ttl },
            encryption: EncryptionConfig {
                mobile_secret: lookup.required("MOBILE_ENCRYPTION_SECRET")?,
            },
            mail,
            rate_limit: RateLimitConfig {
                requests_per_second: lookup
                    .parsed("RATE_LIMIT_REQUESTS_PER_SECOND", default_requests_per_second())?,
                burst: lookup.parsed("RATE_LIMIT_BURST", default_burst())?,
            },
            cors: CorsConfig {
                allowed_origins: lookup
                    .text("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            storage: StorageConfig {
                upload_dir: lookup.text("UPLOAD_DIR").unwrap_or_else(default_upload_dir),
                max_file_size_mb,
            },
        })
    }
}

struct Lookup<'a, F>(&'a F);

impl<F> Lookup<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-empty, trimmed value
    fn text(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.text(key).ok_or(ConfigError::MissingVar(key))
    }

    fn parsed<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.text(key) {
            None => Ok(default),
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw)),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", "jwt-secret"),
            ("MOBILE_ENCRYPTION_SECRET", "mobile-secret"),
        ]
    }

    #[test]
    fn test_environment_is_production() {
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_server_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup_from(&minimal())).unwrap();

        assert_eq!(config.app.name, "identity-server");
        assert_eq!(config.app.env, Environment::Development);
        assert_eq!(config.api.port, 5000);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.database.is_none());
        assert_eq!(config.jwt.session_token_expiry, 604_800);
        assert_eq!(config.otp.ttl_secs, 600);
        assert_eq!(config.mail.provider, MailProvider::Log);
        assert_eq!(config.mail.product_name, "Volunteer App");
        assert_eq!(config.storage.max_file_size_bytes(), 5 * 1024 * 1024);
    }

    #[test]
    fn test_missing_jwt_secret() {
        let pairs: Vec<_> = minimal()
            .into_iter()
            .filter(|(k, _)| *k != "JWT_SECRET")
            .collect();
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("JWT_SECRET")));
    }

    #[test]
    fn test_postgres_backend_requires_database_url() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s"),
            ("MOBILE_ENCRYPTION_SECRET", "m"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DATABASE_URL")));
    }

    #[test]
    fn test_http_mail_requires_credentials() {
        let mut pairs = minimal();
        pairs.push(("MAIL_PROVIDER", "http"));
        pairs.push(("MAIL_API_URL", "https://mail.example.com/send"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("MAIL_API_KEY")));
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let mut pairs = minimal();
        pairs.push(("API_PORT", "not-a-port"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("API_PORT", _)));
    }

    #[test]
    fn test_file_size_limit_is_bounded() {
        for value in ["0", "4096", "4294967295"] {
            let mut pairs = minimal();
            pairs.push(("MAX_FILE_SIZE_MB", value));
            let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue("MAX_FILE_SIZE_MB", _)), "{value}");
        }

        let mut pairs = minimal();
        pairs.push(("MAX_FILE_SIZE_MB", "1024"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.storage.max_file_size_bytes(), 1024 * 1024 * 1024);
    }

    #[test]
    fn test_max_file_size_bytes_saturates() {
        let storage = StorageConfig {
            upload_dir: "uploads".to_string(),
            max_file_size_mb: u32::MAX,
        };
        let expected = usize::try_from(u64::from(u32::MAX) << 20).unwrap_or(usize::MAX);
        assert_eq!(storage.max_file_size_bytes(), expected);
    }

    #[test]
    fn test_cors_origins_split() {
        let mut pairs = minimal();
        pairs.push(("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = AppConfig::from_lookup(lookup_from(&minimal())).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("jwt-secret"));
        assert!(!rendered.contains("mobile-secret"));
    }
}
