//! Mobile-number protection
//!
//! Numbers are sealed with ChaCha20-Poly1305 under a key derived from the
//! server secret, using a fresh random nonce per value. The stored form is
//! base64 of `nonce (12 bytes) || ciphertext`. A separate HMAC-SHA256 digest
//! of the normalized number gives a deterministic lookup key for uniqueness
//! checks, since the ciphertext differs on every encryption.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Key, Nonce,
};
use hmac::{Hmac, Mac};
use idp_core::{DomainError, ProtectedMobile};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 12;
const AAD: &[u8] = b"mobile-number:v1";
const ENCRYPTION_CONTEXT: &[u8] = b"idp/mobile/encryption/v1";
const INDEX_CONTEXT: &[u8] = b"idp/mobile/index/v1";
const MIN_DIGITS: usize = 3;
const MAX_DIGITS: usize = 15;

/// Canonical form of a mobile number: optional leading `+`, then digits.
///
/// Spaces, dashes, dots, and parentheses are dropped.
///
/// # Errors
/// Returns `DomainError::InvalidMobile` for anything else
pub fn normalize_mobile(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    let (plus, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => {
                return Err(DomainError::InvalidMobile(format!(
                    "unexpected character '{c}'"
                )))
            }
        }
    }

    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
        return Err(DomainError::InvalidMobile(format!(
            "expected {MIN_DIGITS}-{MAX_DIGITS} digits"
        )));
    }

    Ok(format!("{plus}{digits}"))
}

/// Keyed encryption and lookup digests for mobile numbers
#[derive(Clone)]
pub struct MobileCipher {
    cipher: ChaCha20Poly1305,
    index_key: [u8; 32],
}

impl MobileCipher {
    /// Derive independent encryption and index keys from the server secret
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let encryption_key = derive_key(ENCRYPTION_CONTEXT, secret);
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&encryption_key)),
            index_key: derive_key(INDEX_CONTEXT, secret),
        }
    }

    /// Normalize, encrypt, and digest a raw mobile number
    ///
    /// # Errors
    /// Returns a domain error for malformed numbers, internal error if sealing fails
    pub fn protect(&self, raw: &str) -> Result<ProtectedMobile, AppError> {
        let normalized = normalize_mobile(raw)?;
        let ciphertext = self.encrypt(&normalized)?;
        let digest = self.digest_normalized(&normalized)?;
        Ok(ProtectedMobile::new(ciphertext, digest))
    }

    /// Recover the normalized number
    ///
    /// # Errors
    /// Returns an internal error if the value was not sealed under this key
    pub fn reveal(&self, mobile: &ProtectedMobile) -> Result<String, AppError> {
        let data = STANDARD
            .decode(&mobile.ciphertext)
            .map_err(|e| AppError::internal(anyhow::anyhow!("Malformed mobile ciphertext: {e}")))?;

        if data.len() < NONCE_LEN {
            return Err(AppError::internal(anyhow::anyhow!(
                "Invalid mobile ciphertext length"
            )));
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce_bytes),
                Payload {
                    msg: ciphertext,
                    aad: AAD,
                },
            )
            .map_err(|e| AppError::internal(anyhow::anyhow!("Mobile decryption failure: {e}")))?;

        String::from_utf8(plaintext)
            .map_err(|e| AppError::internal(anyhow::anyhow!("Mobile is not UTF-8: {e}")))
    }

    fn encrypt(&self, normalized: &str) -> Result<String, AppError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: normalized.as_bytes(),
                    aad: AAD,
                },
            )
            .map_err(|e| AppError::internal(anyhow::anyhow!("Mobile encryption failure: {e}")))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    fn digest_normalized(&self, normalized: &str) -> Result<String, AppError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.index_key)
            .map_err(|e| AppError::internal(anyhow::anyhow!("HMAC key rejected: {e}")))?;
        mac.update(normalized.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for MobileCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MobileCipher").finish_non_exhaustive()
    }
}

fn derive_key(context: &[u8], secret: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(context);
    hasher.update(secret.as_bytes());
    let digest = hasher.finalize();

    let mut key = [0u8; 32];
    key.copy_from_slice(&digest);
    key
}
