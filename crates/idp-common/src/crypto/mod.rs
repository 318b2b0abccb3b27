//! Reversible protection for personal data at rest

mod mobile;

pub use mobile::{normalize_mobile, MobileCipher};
