//! Dispatcher selection from configuration

use std::sync::Arc;
use std::time::Duration;

use idp_common::{AppError, MailConfig, MailProvider};
use idp_core::NotificationDispatcher;

use crate::{HttpApiDispatcher, LogDispatcher, Sender};

/// Build the dispatcher named by `config.provider`
///
/// # Errors
/// Returns `AppError::Config` if the HTTP provider is selected without its
/// endpoint, key, or sender address, or the HTTP client cannot be built
pub fn build_dispatcher(config: &MailConfig) -> Result<Arc<dyn NotificationDispatcher>, AppError> {
    match config.provider {
        MailProvider::Log => Ok(Arc::new(LogDispatcher::new())),
        MailProvider::Http => {
            let require = |value: &Option<String>, key: &str| {
                value
                    .as_deref()
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| AppError::Config(format!("{key} is required")))
            };

            let api_url = require(&config.api_url, "MAIL_API_URL")?;
            let api_key = require(&config.api_key, "MAIL_API_KEY")?;
            let sender_email = require(&config.sender_email, "MAIL_SENDER_EMAIL")?;

            let dispatcher = HttpApiDispatcher::new(
                api_url,
                api_key,
                Sender {
                    email: sender_email,
                    name: Some(config.sender_name.clone()),
                },
                config.product_name.clone(),
                Duration::from_secs(config.timeout_secs),
            )
            .map_err(|e| AppError::Config(format!("Failed to build mail client: {e}")))?;

            Ok(Arc::new(dispatcher))
        }
    }
}
