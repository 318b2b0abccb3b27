//! # idp-db
//!
//! Credential store implementations of `idp_core::AccountRepository`.
//!
//! ## Overview
//!
//! - Connection pool management and schema migrations (PostgreSQL)
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - `PgAccountRepository` for production and `MemoryAccountRepository`
//!   for development and tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use idp_db::{create_pool, run_migrations, PgAccountRepository, MIGRATIONS_DIR};
//!
//! async fn example(config: &idp_common::DatabaseConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(config).await?;
//!     run_migrations(&pool, MIGRATIONS_DIR).await?;
//!     let repo = PgAccountRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, PgPool, MIGRATIONS_DIR};
pub use repositories::{MemoryAccountRepository, PgAccountRepository};
