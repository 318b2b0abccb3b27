//! Integration test utilities for the identity server
//!
//! This crate provides helpers for running end-to-end tests against
//! the REST API on an ephemeral port.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
