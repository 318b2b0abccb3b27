//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`] for the duration of a
//! request.

pub mod account;
pub mod context;
pub mod error;
pub mod profile;

#[cfg(test)]
mod test_support;

pub use account::AccountService;
pub use context::{ServiceContext, ServiceContextBuilder, ServiceSettings};
pub use error::{ServiceError, ServiceResult};
pub use profile::ProfileService;
