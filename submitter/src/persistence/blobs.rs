use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::info;

use super::StorageError;

/// Byte storage for documents and page images.
#[async_trait::async_trait]
pub trait IBlobStorage: Send + Sync {
    /// Stores `content` under `key` and returns the reference to retrieve it by.
    async fn put(&self, key: &str, content: Vec<u8>) -> Result<String, StorageError>;
    async fn get(&self, reference: &str) -> Result<Option<Vec<u8>>, StorageError>;
    /// Deleting a missing reference is not an error.
    async fn delete(&self, reference: &str) -> Result<(), StorageError>;
}

/// Reduces an externally supplied identifier to a safe single path segment.
pub fn storage_segment(id: &str) -> String {
    let segment: String = id.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_').collect();
    if segment.is_empty() {
        "_".to_string()
    } else {
        segment
    }
}

pub struct FileSystemBlobStorage {
    root: PathBuf,
}

impl FileSystemBlobStorage {
    pub async fn build(root: PathBuf) -> Result<Self, &'static str> {
        fs::create_dir_all(&root).await.map_err(|_| "Could not create storage root")?;
        Ok(FileSystemBlobStorage { root })
    }

    fn path(&self, reference: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(reference);
        let valid = !reference.is_empty() && relative.components().all(|component| matches!(component, Component::Normal(_)));
        if !valid {
            return Err(StorageError::InvalidKey(reference.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait::async_trait]
impl IBlobStorage for FileSystemBlobStorage {
    async fn put(&self, key: &str, content: Vec<u8>) -> Result<String, StorageError> {
        let path = self.path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let partial = path.with_extension("partial");
        fs::write(&partial, &content).await?;
        fs::rename(&partial, &path).await?;
        info!("Stored {} ({} bytes)", key, content.len());
        Ok(key.to_string())
    }

    async fn get(&self, reference: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path(reference)?).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, reference: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(reference)?).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
