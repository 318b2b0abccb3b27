//! Mobile number in its protected, at-rest form

/// Reversibly encrypted mobile number plus its keyed lookup digest.
///
/// `ciphertext` changes on every encryption (fresh nonce), so equality and
/// uniqueness checks go through `digest`, which is deterministic for a given
/// server secret and normalized number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedMobile {
    pub ciphertext: String,
    pub digest: String,
}

impl ProtectedMobile {
    pub fn new(ciphertext: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            ciphertext: ciphertext.into(),
            digest: digest.into(),
        }
    }
}
