//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers, capturing outbound mail,
//! and making HTTP requests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use idp_api::{create_app, create_app_state_with};
use idp_common::AppConfig;
use idp_core::{DeliveryReport, Notification, NotificationDispatcher, NotificationKind};
use parking_lot::Mutex;
use reqwest::{multipart, Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Dispatcher that keeps every notification for inspection
#[derive(Default)]
pub struct CapturingDispatcher {
    sent: Mutex<Vec<Notification>>,
}

impl CapturingDispatcher {
    /// The code carried by the latest notification of `kind` sent to `to`
    pub fn last_code(&self, to: &str, kind: NotificationKind) -> Option<String> {
        self.sent
            .lock()
            .iter()
            .rev()
            .find(|n| n.to == to && n.kind == kind)
            .and_then(|n| n.body.rsplit(' ').next().map(str::to_string))
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl NotificationDispatcher for CapturingDispatcher {
    async fn send(&self, notification: &Notification) -> DeliveryReport {
        self.sent.lock().push(notification.clone());
        DeliveryReport::delivered(format!("<{}@capture>", uuid::Uuid::new_v4()))
    }

    fn name(&self) -> &'static str {
        "capture"
    }
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub mail: Arc<CapturingDispatcher>,
    pub upload_dir: PathBuf,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server on the in-memory store
    pub async fn start() -> Result<Self> {
        let upload_dir = std::env::temp_dir().join(format!("idp-it-{}", uuid::Uuid::new_v4()));
        let config = test_config(&upload_dir, &[])?;
        Self::start_with_config(config, upload_dir).await
    }

    /// Start a test server with extra configuration values
    pub async fn start_with(overrides: &[(&str, &str)]) -> Result<Self> {
        let upload_dir = std::env::temp_dir().join(format!("idp-it-{}", uuid::Uuid::new_v4()));
        let config = test_config(&upload_dir, overrides)?;
        Self::start_with_config(config, upload_dir).await
    }

    async fn start_with_config(config: AppConfig, upload_dir: PathBuf) -> Result<Self> {
        let mail = Arc::new(CapturingDispatcher::default());

        let state = create_app_state_with(config, mail.clone()).await?;
        let app = create_app(state)?;

        // Ephemeral port
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            mail,
            upload_dir,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    /// Make a PUT request with auth token
    pub async fn put_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a PUT request without credentials
    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.put(self.url(path)).json(body).send().await?)
    }

    /// Make a DELETE request with auth token
    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Upload a file as the `profilePic` multipart field
    pub async fn upload_auth(
        &self,
        path: &str,
        token: &str,
        field: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> Result<Response> {
        let part = multipart::Part::bytes(bytes)
            .file_name("picture.bin")
            .mime_str(mime)?;
        let form = multipart::Form::new().part(field.to_string(), part);
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?)
    }

    /// Registration code most recently mailed to `email`
    pub fn registration_code(&self, email: &str) -> Result<String> {
        self.mail
            .last_code(email, NotificationKind::RegistrationCode)
            .ok_or_else(|| anyhow::anyhow!("no registration code sent to {email}"))
    }

    /// Reset code most recently mailed to `email`
    pub fn reset_code(&self, email: &str) -> Result<String> {
        self.mail
            .last_code(email, NotificationKind::ResetCode)
            .ok_or_else(|| anyhow::anyhow!("no reset code sent to {email}"))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

/// Configuration for an isolated server: memory store, log mail, temp uploads
pub fn test_config(upload_dir: &std::path::Path, overrides: &[(&str, &str)]) -> Result<AppConfig> {
    let upload_dir = upload_dir.to_string_lossy().into_owned();
    let mut values: Vec<(String, String)> = vec![
        ("STORE_BACKEND".into(), "memory".into()),
        ("JWT_SECRET".into(), "integration-test-jwt-secret".into()),
        ("MOBILE_ENCRYPTION_SECRET".into(), "integration-test-mobile-secret".into()),
        ("UPLOAD_DIR".into(), upload_dir),
        ("RATE_LIMIT_REQUESTS_PER_SECOND".into(), "1000".into()),
        ("RATE_LIMIT_BURST".into(), "1000".into()),
    ];
    for (key, value) in overrides {
        values.retain(|(k, _)| k != key);
        values.push(((*key).to_string(), (*value).to_string()));
    }

    AppConfig::from_lookup(|key| {
        values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    })
    .map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status and return the error code from the body
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: serde_json::Value = assert_json(response, expected_status).await?;
    body["error"]["code"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("missing error code in {body}"))
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}
