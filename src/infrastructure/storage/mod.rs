//! Object Storage
//!
//! Minimal object-store collaborator for file/image attachments: save, get
//! and delete by key, each bounded by a timeout. The local-filesystem
//! implementation keeps everything under a configured root directory.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::config::StorageSettings;
use crate::shared::error::AppError;

/// Object storage contract. Keys are relative, slash-separated paths.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store bytes under a key, creating intermediate directories.
    async fn save(&self, key: &str, bytes: Vec<u8>) -> Result<(), AppError>;

    /// Fetch the bytes stored under a key.
    async fn get(&self, key: &str) -> Result<Vec<u8>, AppError>;

    /// Remove the object stored under a key.
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

/// Local-filesystem object storage rooted at a configured directory.
pub struct LocalStorage {
    root: PathBuf,
    op_timeout: Duration,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, op_timeout: Duration) -> Self {
        Self {
            root: root.into(),
            op_timeout,
        }
    }

    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(
            &settings.root,
            Duration::from_secs(settings.operation_timeout_secs),
        )
    }

    /// Resolve a key against the root, rejecting anything that could step
    /// outside of it.
    fn resolve(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key);

        if key.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(AppError::BadRequest(format!("Invalid storage key: {key}")));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn save(&self, key: &str, bytes: Vec<u8>) -> Result<(), AppError> {
        let path = self.resolve(key)?;

        timeout(self.op_timeout, async {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, &bytes).await
        })
        .await
        .map_err(|_| AppError::Internal(format!("Storage save timed out for {key}")))?
        .map_err(|e| AppError::Internal(format!("Storage save failed for {key}: {e}")))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let path = self.resolve(key)?;

        timeout(self.op_timeout, tokio::fs::read(&path))
            .await
            .map_err(|_| AppError::Internal(format!("Storage get timed out for {key}")))?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    AppError::NotFound(format!("Object {key} not found"))
                }
                _ => AppError::Internal(format!("Storage get failed for {key}: {e}")),
            })
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.resolve(key)?;

        timeout(self.op_timeout, tokio::fs::remove_file(&path))
            .await
            .map_err(|_| AppError::Internal(format!("Storage delete timed out for {key}")))?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    AppError::NotFound(format!("Object {key} not found"))
                }
                _ => AppError::Internal(format!("Storage delete failed for {key}: {e}")),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_storage() -> LocalStorage {
        let root = std::env::temp_dir().join(format!("storage-test-{}", Uuid::new_v4()));
        LocalStorage::new(root, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn save_then_get_roundtrip() {
        let storage = test_storage();
        storage
            .save("avatars/u1.png", b"png-bytes".to_vec())
            .await
            .unwrap();

        let bytes = storage.get("avatars/u1.png").await.unwrap();
        assert_eq!(bytes, b"png-bytes");
    }

    #[tokio::test]
    async fn get_missing_key_is_not_found() {
        let storage = test_storage();
        let err = storage.get("nope.txt").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_the_object() {
        let storage = test_storage();
        storage.save("tmp/file.bin", vec![1, 2, 3]).await.unwrap();
        storage.delete("tmp/file.bin").await.unwrap();

        let err = storage.get("tmp/file.bin").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let storage = test_storage();
        for key in ["../etc/passwd", "/abs/path", "a/../../b", ""] {
            let err = storage.get(key).await.unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "key: {key}");
        }
    }
}
