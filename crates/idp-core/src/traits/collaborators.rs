//! Out-of-band collaborators: notification delivery and binary file storage

use async_trait::async_trait;

use crate::entities::{DeliveryReport, Notification};
use crate::traits::RepoResult;

/// Delivers a notification out-of-band.
///
/// Delivery problems are reported in the returned [`DeliveryReport`] rather
/// than as an error; the caller decides how to surface them.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, notification: &Notification) -> DeliveryReport;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Reference to a stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Relative path under the storage root, saved on the account
    pub reference: String,
    pub size: usize,
}

/// Binary storage for profile pictures
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Write `bytes` under `key` (a relative path), replacing any existing file
    async fn put(&self, key: &str, bytes: &[u8]) -> RepoResult<StoredFile>;

    /// Remove a previously stored file. Missing files are not an error.
    async fn remove(&self, key: &str) -> RepoResult<()>;
}
