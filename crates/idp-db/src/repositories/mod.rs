//! Repository implementations
//!
//! PostgreSQL and in-memory implementations of the credential store trait
//! defined in idp-core.

mod account;
mod error;
mod memory;

pub use account::PgAccountRepository;
pub use memory::MemoryAccountRepository;
