//! # idp-api
//!
//! REST API server built with the Axum framework: the `/api/auth` account
//! routes, health probes, and the middleware stack around them.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, create_app_state_with, run, run_server};
pub use state::AppState;
