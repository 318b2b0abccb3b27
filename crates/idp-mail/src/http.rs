//! Transactional-email HTTP API dispatcher

use std::time::Duration;

use async_trait::async_trait;
use idp_core::{DeliveryReport, Notification, NotificationDispatcher};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::templates;

/// From-address on outgoing mail
#[derive(Debug, Clone)]
pub struct Sender {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody<'a> {
    sender: EmailAddress<'a>,
    to: Vec<EmailAddress<'a>>,
    subject: &'a str,
    html_content: String,
    text_content: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailReply {
    message_id: Option<String>,
}

fn is_success_status(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// Posts each notification as JSON to a transactional-email endpoint,
/// authenticating with an `api-key` header.
#[derive(Clone)]
pub struct HttpApiDispatcher {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    sender: Sender,
    product_name: String,
}

impl HttpApiDispatcher {
    /// Create a dispatcher whose requests give up after `timeout`
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        sender: Sender,
        product_name: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("idp-mail/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            sender,
            product_name: product_name.into(),
        })
    }

    async fn post(&self, notification: &Notification) -> Result<String, String> {
        let body = SendEmailBody {
            sender: EmailAddress {
                email: &self.sender.email,
                name: self.sender.name.as_deref(),
            },
            to: vec![EmailAddress {
                email: &notification.to,
                name: None,
            }],
            subject: &notification.subject,
            html_content: templates::render_html(notification, &self.product_name),
            text_content: &notification.body,
        };

        let resp = self
            .client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("send failed: {e}"))?;

        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        if !is_success_status(status) {
            return Err(format!("send failed (status={status}): {text}"));
        }

        let message_id = serde_json::from_str::<SendEmailReply>(&text)
            .ok()
            .and_then(|reply| reply.message_id)
            .unwrap_or_else(|| format!("<{}@idp.local>", Uuid::new_v4()));
        Ok(message_id)
    }
}

impl std::fmt::Debug for HttpApiDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApiDispatcher")
            .field("api_url", &self.api_url)
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NotificationDispatcher for HttpApiDispatcher {
    #[instrument(skip_all, fields(to = %notification.to, kind = %notification.kind))]
    async fn send(&self, notification: &Notification) -> DeliveryReport {
        match self.post(notification).await {
            Ok(message_id) => {
                info!(message_id = %message_id, "Email sent");
                DeliveryReport::delivered(message_id)
            }
            Err(error) => {
                warn!(error = %error, "Email delivery failed");
                DeliveryReport::failed(error)
            }
        }
    }

    fn name(&self) -> &'static str {
        "http-api"
    }
}
