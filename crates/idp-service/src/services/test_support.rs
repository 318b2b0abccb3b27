//! Shared fixtures for service tests

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use idp_common::{JwtService, MobileCipher};
use idp_core::{
    Account, AccountRepository, DeliveryReport, Notification, NotificationDispatcher,
    NotificationKind,
};
use idp_db::MemoryAccountRepository;
use parking_lot::Mutex;

use crate::dto::{RegisterRequest, VerifyCodeRequest};
use crate::storage::LocalFileStore;

use super::context::{ServiceContext, ServiceContextBuilder, ServiceSettings};

pub const PASSWORD: &str = "Secr3t!";

/// Dispatcher that records every notification it is handed
#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingDispatcher {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn send(&self, notification: &Notification) -> DeliveryReport {
        self.sent.lock().push(notification.clone());
        if self.fail {
            DeliveryReport::failed("smtp unavailable")
        } else {
            DeliveryReport::delivered(format!("<{}@test>", self.sent.lock().len()))
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub struct TestHarness {
    pub ctx: ServiceContext,
    pub repo: Arc<MemoryAccountRepository>,
    pub dispatcher: Arc<RecordingDispatcher>,
    pub upload_dir: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::build(RecordingDispatcher::default(), ServiceSettings::default())
    }

    pub fn with_failing_dispatcher() -> Self {
        Self::build(RecordingDispatcher::failing(), ServiceSettings::default())
    }

    pub fn with_otp_ttl(ttl: chrono::Duration) -> Self {
        Self::build(
            RecordingDispatcher::default(),
            ServiceSettings {
                otp_ttl: ttl,
                ..ServiceSettings::default()
            },
        )
    }

    pub fn with_settings(settings: ServiceSettings) -> Self {
        Self::build(RecordingDispatcher::default(), settings)
    }

    fn build(dispatcher: RecordingDispatcher, settings: ServiceSettings) -> Self {
        let repo = Arc::new(MemoryAccountRepository::new());
        let dispatcher = Arc::new(dispatcher);
        let upload_dir = std::env::temp_dir().join(format!("idp-service-{}", uuid::Uuid::new_v4()));

        let ctx = ServiceContextBuilder::new()
            .account_repo(repo.clone())
            .dispatcher(dispatcher.clone())
            .file_store(Arc::new(LocalFileStore::new(&upload_dir)))
            .jwt_service(Arc::new(JwtService::new("test-secret-key-for-testing", 3600)))
            .mobile_cipher(Arc::new(MobileCipher::new("test-mobile-secret")))
            .settings(settings)
            .build()
            .expect("all dependencies are set");

        Self {
            ctx,
            repo,
            dispatcher,
            upload_dir,
        }
    }

    pub fn register_request(&self) -> RegisterRequest {
        RegisterRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "a@x.com".to_string(),
            password: PASSWORD.to_string(),
            mobile_number: "+100".to_string(),
            gender: "female".to_string(),
        }
    }

    pub fn verify(email: &str, otp: &str) -> VerifyCodeRequest {
        VerifyCodeRequest {
            email: email.to_string(),
            otp: otp.to_string(),
        }
    }

    /// A six-digit code guaranteed to differ from `code`
    pub fn wrong_code(code: &str) -> String {
        if code == "000000" {
            "111111".to_string()
        } else {
            "000000".to_string()
        }
    }

    pub async fn account(&self, email: &str) -> Account {
        self.repo
            .find_by_email(email)
            .await
            .unwrap()
            .expect("account exists")
    }

    /// The code carried by the most recent notification of `kind`
    pub fn last_code(&self, kind: NotificationKind) -> String {
        let sent = self.dispatcher.sent();
        let notification = sent
            .iter()
            .rev()
            .find(|n| n.kind == kind)
            .expect("notification was sent");
        notification
            .body
            .rsplit(' ')
            .next()
            .expect("body ends with the code")
            .to_string()
    }

    /// Register and verify the default account
    pub async fn verified_account(&self) -> Account {
        let service = super::AccountService::new(&self.ctx);
        service.register(self.register_request()).await.unwrap();
        let code = self.last_code(NotificationKind::RegistrationCode);
        service
            .verify_registration(Self::verify("a@x.com", &code))
            .await
            .unwrap();
        self.account("a@x.com").await
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}
