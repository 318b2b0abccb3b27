//! Session tokens
//!
//! Stateless HS256 bearer tokens issued at login, carrying the account id,
//! issue time, and expiry. There is no server-side revocation; a token is
//! good until it expires.

use chrono::{Duration, Utc};
use idp_core::AccountId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Get the subject as an account ID
    ///
    /// # Errors
    /// Returns `AppError::InvalidToken` if the subject is not an account ID
    pub fn account_id(&self) -> Result<AccountId, AppError> {
        self.sub.parse().map_err(|_| AppError::InvalidToken)
    }
}

/// Token handed to the client after a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// JWT service for encoding and decoding session tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_token_expiry: i64,
}

impl JwtService {
    /// Create a new JWT service with the given secret and lifetime in seconds
    #[must_use]
    pub fn new(secret: &str, session_token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_token_expiry,
        }
    }

    #[must_use]
    pub fn session_token_expiry(&self) -> i64 {
        self.session_token_expiry
    }

    /// Issue a session token bound to an account
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue(&self, account_id: AccountId) -> Result<SessionToken, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: account_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.session_token_expiry)).timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode JWT: {e}")))?;

        Ok(SessionToken {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.session_token_expiry,
        })
    }

    /// Decode and validate a token
    ///
    /// # Errors
    /// Returns `AppError::InvalidToken` for any failure, expiry included
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("session_token_expiry", &self.session_token_expiry)
            .finish_non_exhaustive()
    }
}
