//! Entity to model mappers
//!
//! - `TryFrom<AccountModel> for Account`: convert database rows to domain objects
//! - `AccountInsert` / `PatchColumns`: prepare entity data for database writes

mod account;

pub use account::{AccountInsert, PatchColumns};
