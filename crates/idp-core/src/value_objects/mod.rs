//! Value objects - immutable types with identity defined by their value

mod account_id;
mod gender;
mod one_time_code;
mod protected_mobile;

pub use account_id::AccountId;
pub use gender::Gender;
pub use one_time_code::{generate_code, OneTimeCode, CODE_LENGTH, DEFAULT_CODE_TTL_SECS};
pub use protected_mobile::ProtectedMobile;
