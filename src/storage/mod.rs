//! Uploaded image storage on the local filesystem.
//!
//! Files live under the configured upload directory (served statically at
//! `/uploads/images`). The path returned by [`ImageStore::save`] is the image
//! reference stored on users and places.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::config::UploadConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("Image exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub struct ImageStore {
    dir: PathBuf,
    max_image_bytes: usize,
}

impl ImageStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            max_image_bytes: config.max_image_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Writes the image and returns its stored path.
    pub async fn save(&self, content_type: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let extension = extension_for(content_type)
            .ok_or_else(|| StorageError::UnsupportedType(content_type.to_string()))?;

        if bytes.len() > self.max_image_bytes {
            return Err(StorageError::TooLarge {
                limit: self.max_image_bytes,
            });
        }

        let path = self.dir.join(format!("{}.{}", Uuid::new_v4(), extension));
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!("Stored uploaded image at {}", path.display());
        Ok(path.to_string_lossy().into_owned())
    }

    /// Best-effort delete. Never fails the caller.
    pub async fn remove(&self, stored_path: &str) {
        let path = Path::new(stored_path);

        // starts_with compares components lexically, so `..` must be refused on its own
        let escapes = path.components().any(|c| matches!(c, Component::ParentDir));
        if escapes || !path.starts_with(&self.dir) {
            tracing::warn!("Refusing to delete {} outside the upload directory", stored_path);
            return;
        }

        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!("Could not delete image {}: {}", stored_path, e);
        }
    }
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpeg"),
        "image/jpg" => Some("jpg"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(max_image_bytes: usize) -> ImageStore {
        let dir = std::env::temp_dir().join(format!("places-api-storage-{}", Uuid::new_v4()));
        ImageStore::new(&UploadConfig { dir, max_image_bytes })
    }

    #[tokio::test]
    async fn saves_and_removes_png() {
        let store = store(1024);
        store.ensure_dir().await.unwrap();

        let path = store.save("image/png", b"\x89PNG fake").await.unwrap();
        assert!(path.ends_with(".png"));
        assert!(Path::new(&path).starts_with(store.dir()));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"\x89PNG fake");

        store.remove(&path).await;
        assert!(!Path::new(&path).exists());
    }

    #[tokio::test]
    async fn rejects_unsupported_types() {
        let store = store(1024);
        store.ensure_dir().await.unwrap();

        let err = store.save("application/pdf", b"%PDF").await.unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedType(t) if t == "application/pdf"));
    }

    #[tokio::test]
    async fn rejects_oversized_images() {
        let store = store(4);
        store.ensure_dir().await.unwrap();

        let err = store.save("image/jpeg", b"too big").await.unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { limit: 4 }));
    }

    #[tokio::test]
    async fn remove_ignores_missing_and_foreign_files() {
        let store = store(1024);
        store.ensure_dir().await.unwrap();

        let outside = std::env::temp_dir().join(format!("places-api-outside-{}", Uuid::new_v4()));
        tokio::fs::write(&outside, b"keep").await.unwrap();

        store.remove(&store.dir().join("missing.png").to_string_lossy()).await;
        store.remove(&outside.to_string_lossy()).await;

        assert!(outside.exists());
        tokio::fs::remove_file(&outside).await.unwrap();
    }

    #[tokio::test]
    async fn remove_refuses_parent_dir_traversal() {
        let store = store(1024);
        store.ensure_dir().await.unwrap();

        let sibling = store.dir().with_file_name(format!("places-api-sibling-{}.png", Uuid::new_v4()));
        tokio::fs::write(&sibling, b"keep").await.unwrap();

        let traversal = store.dir().join("..").join(sibling.file_name().unwrap());
        assert!(traversal.starts_with(store.dir()));
        store.remove(&traversal.to_string_lossy()).await;

        assert!(sibling.exists());
        tokio::fs::remove_file(&sibling).await.unwrap();
    }
}
