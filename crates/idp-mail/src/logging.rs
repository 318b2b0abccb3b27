//! Dispatcher that only logs

use async_trait::async_trait;
use idp_core::{DeliveryReport, Notification, NotificationDispatcher};
use tracing::info;
use uuid::Uuid;

/// Writes each notification to the log and reports it delivered.
///
/// The body is logged too, so codes are visible to whoever reads the logs.
/// Meant for local development only.
#[derive(Debug, Clone, Default)]
pub struct LogDispatcher;

impl LogDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn send(&self, notification: &Notification) -> DeliveryReport {
        let message_id = format!("<{}@log.local>", Uuid::new_v4());
        info!(
            to = %notification.to,
            kind = %notification.kind,
            subject = %notification.subject,
            body = %notification.body,
            message_id = %message_id,
            "notification logged instead of sent"
        );
        DeliveryReport::delivered(message_id)
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
