//! Local filesystem store for profile pictures

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use idp_core::{DomainError, FileStore, RepoResult, StoredFile};
use tracing::{debug, instrument};

/// Writes files beneath a root directory, keyed by relative path
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `key` under the root, refusing anything that could escape it
    fn resolve(&self, key: &str) -> RepoResult<PathBuf> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(DomainError::StorageError(format!("invalid file key: {key}")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, key: &str, bytes: &[u8]) -> RepoResult<StoredFile> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::StorageError(e.to_string()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| DomainError::StorageError(e.to_string()))?;

        debug!(path = %path.display(), "File written");
        Ok(StoredFile {
            reference: key.to_string(),
            size: bytes.len(),
        })
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> RepoResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::StorageError(e.to_string())),
        }
    }
}
