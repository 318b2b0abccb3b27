//! Service context - dependency container for services
//!
//! Built once at startup from configuration and shared by every request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use idp_common::{AppConfig, JwtService, MobileCipher, PasswordService};
use idp_core::{
    Account, AccountRepository, DeliveryReport, FileStore, Notification, NotificationDispatcher,
    RepoResult,
};
use tracing::{error, info, warn};

use crate::dto::AccountResponse;

use super::error::{ServiceError, ServiceResult};

/// Tunables that shape service behavior
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Validity window of a freshly issued one-time code
    pub otp_ttl: chrono::Duration,
    /// Upper bound on a single store call
    pub store_timeout: Duration,
    /// Upper bound on a single notification dispatch
    pub dispatch_timeout: Duration,
    /// Largest accepted profile picture, in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            otp_ttl: chrono::Duration::seconds(idp_core::DEFAULT_CODE_TTL_SECS),
            store_timeout: Duration::from_secs(5),
            dispatch_timeout: Duration::from_secs(10),
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

impl ServiceSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            otp_ttl: chrono::Duration::seconds(config.otp.ttl_secs),
            store_timeout: Duration::from_secs(config.store.timeout_secs),
            dispatch_timeout: Duration::from_secs(config.mail.timeout_secs),
            max_upload_bytes: config.storage.max_file_size_bytes(),
        }
    }
}

/// Service context containing all dependencies
///
/// Provides access to:
/// - The credential store
/// - The notification dispatcher and profile-picture file store
/// - Session tokens, password hashing, and mobile-number encryption
#[derive(Clone)]
pub struct ServiceContext {
    account_repo: Arc<dyn AccountRepository>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    file_store: Arc<dyn FileStore>,
    jwt_service: Arc<JwtService>,
    password_service: PasswordService,
    mobile_cipher: Arc<MobileCipher>,
    settings: ServiceSettings,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        account_repo: Arc<dyn AccountRepository>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        file_store: Arc<dyn FileStore>,
        jwt_service: Arc<JwtService>,
        mobile_cipher: Arc<MobileCipher>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            account_repo,
            dispatcher,
            file_store,
            jwt_service,
            password_service: PasswordService::new(),
            mobile_cipher,
            settings,
        }
    }

    /// Get the account repository
    pub fn account_repo(&self) -> &dyn AccountRepository {
        self.account_repo.as_ref()
    }

    /// Get the notification dispatcher
    pub fn dispatcher(&self) -> &dyn NotificationDispatcher {
        self.dispatcher.as_ref()
    }

    /// Get the profile-picture file store
    pub fn file_store(&self) -> &dyn FileStore {
        self.file_store.as_ref()
    }

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn password_service(&self) -> &PasswordService {
        &self.password_service
    }

    pub fn mobile_cipher(&self) -> &MobileCipher {
        self.mobile_cipher.as_ref()
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Run a store call under the store timeout
    pub(crate) async fn store<T, F>(&self, op: &'static str, call: F) -> ServiceResult<T>
    where
        F: Future<Output = RepoResult<T>>,
    {
        match tokio::time::timeout(self.settings.store_timeout, call).await {
            Ok(result) => result.map_err(ServiceError::from),
            Err(_) => {
                error!(op, timeout = ?self.settings.store_timeout, "Store call timed out");
                Err(ServiceError::transient(format!("{op} timed out")))
            }
        }
    }

    /// Send a notification under the dispatch timeout.
    ///
    /// Returns whether it was delivered. Failures are logged, never raised,
    /// so an already committed state change stands.
    pub(crate) async fn notify(&self, notification: &Notification) -> bool {
        let sent = tokio::time::timeout(
            self.settings.dispatch_timeout,
            self.dispatcher.send(notification),
        )
        .await;

        match sent {
            Ok(DeliveryReport::Delivered { message_id }) => {
                info!(
                    dispatcher = self.dispatcher.name(),
                    kind = %notification.kind,
                    message_id = %message_id,
                    "Notification delivered"
                );
                true
            }
            Ok(DeliveryReport::Failed { error: reason }) => {
                error!(
                    dispatcher = self.dispatcher.name(),
                    kind = %notification.kind,
                    error = %reason,
                    "Notification dispatch failed"
                );
                false
            }
            Err(_) => {
                error!(
                    dispatcher = self.dispatcher.name(),
                    kind = %notification.kind,
                    timeout = ?self.settings.dispatch_timeout,
                    "Notification dispatch timed out"
                );
                false
            }
        }
    }

    /// Owner's view of an account, with the mobile number decrypted
    pub(crate) fn account_view(&self, account: &Account) -> ServiceResult<AccountResponse> {
        let mobile = self.mobile_cipher.reveal(&account.mobile).map_err(|e| {
            warn!(account_id = %account.id, "Stored mobile number could not be decrypted");
            ServiceError::App(e)
        })?;
        Ok(AccountResponse::from_account(account, mobile))
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("dispatcher", &self.dispatcher.name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    account_repo: Option<Arc<dyn AccountRepository>>,
    dispatcher: Option<Arc<dyn NotificationDispatcher>>,
    file_store: Option<Arc<dyn FileStore>>,
    jwt_service: Option<Arc<JwtService>>,
    mobile_cipher: Option<Arc<MobileCipher>>,
    settings: ServiceSettings,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account_repo(mut self, repo: Arc<dyn AccountRepository>) -> Self {
        self.account_repo = Some(repo);
        self
    }

    pub fn dispatcher(mut self, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn file_store(mut self, store: Arc<dyn FileStore>) -> Self {
        self.file_store = Some(store);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn mobile_cipher(mut self, cipher: Arc<MobileCipher>) -> Self {
        self.mobile_cipher = Some(cipher);
        self
    }

    pub fn settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.account_repo
                .ok_or_else(|| ServiceError::validation("account_repo is required"))?,
            self.dispatcher
                .ok_or_else(|| ServiceError::validation("dispatcher is required"))?,
            self.file_store
                .ok_or_else(|| ServiceError::validation("file_store is required"))?,
            self.jwt_service
                .ok_or_else(|| ServiceError::validation("jwt_service is required"))?,
            self.mobile_cipher
                .ok_or_else(|| ServiceError::validation("mobile_cipher is required"))?,
            self.settings,
        ))
    }
}
