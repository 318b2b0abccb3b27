//! # idp-core
//!
//! Domain layer containing the account record, one-time codes, value objects,
//! and the traits implemented by the infrastructure crates (store, mail, files).
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Account, AccountPatch, CodeChange, DeliveryReport, NewAccount, Notification,
    NotificationKind,
};
pub use error::DomainError;
pub use traits::{
    AccountRepository, FileStore, NotificationDispatcher, RepoResult, StoredFile,
};
pub use value_objects::{
    generate_code, AccountId, Gender, OneTimeCode, ProtectedMobile, CODE_LENGTH,
    DEFAULT_CODE_TTL_SECS,
};
