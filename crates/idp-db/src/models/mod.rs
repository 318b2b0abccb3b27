//! Database models - SQLx-compatible structs for PostgreSQL tables

mod account;

pub use account::AccountModel;
