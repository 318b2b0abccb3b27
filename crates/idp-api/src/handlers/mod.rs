//! Route handlers
//!
//! All HTTP request handlers organized by concern.

pub mod auth;
pub mod health;
pub mod profile;
