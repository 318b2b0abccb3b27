//! # idp-mail
//!
//! Implementations of `idp_core::NotificationDispatcher`:
//!
//! - [`LogDispatcher`] writes notifications to the log (development default)
//! - [`HttpApiDispatcher`] posts them to a JSON transactional-email API
//!
//! [`build_dispatcher`] picks one from [`idp_common::MailConfig`].

mod factory;
mod http;
mod logging;
pub mod templates;

pub use factory::build_dispatcher;
pub use http::{HttpApiDispatcher, Sender};
pub use logging::LogDispatcher;
