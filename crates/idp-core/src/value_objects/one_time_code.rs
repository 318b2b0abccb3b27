//! One-time codes gating email verification and password reset
//!
//! A code is a 6-digit numeric string with an absolute expiry. The value and
//! its expiry live in one struct, so an account either carries both or neither.

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, Rng};

/// Number of digits in a generated code
pub const CODE_LENGTH: usize = 6;

/// Default validity window (10 minutes)
pub const DEFAULT_CODE_TTL_SECS: i64 = 600;

/// Generate a numeric code from the operating system RNG.
///
/// Calls are independent; two accounts may receive the same code.
pub fn generate_code() -> String {
    let mut rng = OsRng;
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// A code value together with the instant after which it stops being valid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeCode {
    value: String,
    expires_at: DateTime<Utc>,
}

impl OneTimeCode {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Issue a fresh random code valid for `ttl` from now
    pub fn generate(ttl: Duration) -> Self {
        Self::new(generate_code(), Utc::now() + ttl)
    }

    /// Rebuild from separately stored columns.
    ///
    /// Returns `None` unless both halves are present.
    pub fn from_parts(value: Option<String>, expires_at: Option<DateTime<Utc>>) -> Option<Self> {
        match (value, expires_at) {
            (Some(value), Some(expires_at)) => Some(Self { value, expires_at }),
            _ => None,
        }
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Check if the code has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// A submission is accepted iff it matches AND `now <= expires_at`
    pub fn verify(&self, submitted: &str, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now) && constant_time_eq(self.value.as_bytes(), submitted.as_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
