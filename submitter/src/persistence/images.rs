use std::collections::HashMap;

use tokio::sync::RwLock;

use super::StorageError;
use crate::models::StoredImage;

/// Record store holding each owning record's document reference and ordered page images.
#[async_trait::async_trait]
pub trait IImageRepository: Send + Sync {
    async fn images(&self, record_id: &str) -> Result<Vec<StoredImage>, StorageError>;
    /// Atomically swaps the image set of a record and returns the replaced set.
    async fn replace_images(&self, record_id: &str, images: Vec<StoredImage>) -> Result<Vec<StoredImage>, StorageError>;
    async fn document(&self, record_id: &str) -> Result<Option<String>, StorageError>;
    /// Returns the replaced document reference, if any.
    async fn set_document(&self, record_id: &str, reference: String) -> Result<Option<String>, StorageError>;
}

#[derive(Debug, Default)]
struct RecordModel {
    document: Option<String>,
    images: Vec<StoredImage>,
}

#[derive(Debug, Default)]
pub struct InMemoryImageRepository {
    records: RwLock<HashMap<String, RecordModel>>,
}

#[async_trait::async_trait]
impl IImageRepository for InMemoryImageRepository {
    async fn images(&self, record_id: &str) -> Result<Vec<StoredImage>, StorageError> {
        Ok(self.records.read().await.get(record_id).map(|record| record.images.clone()).unwrap_or_default())
    }

    async fn replace_images(&self, record_id: &str, images: Vec<StoredImage>) -> Result<Vec<StoredImage>, StorageError> {
        if let Some(foreign) = images.iter().find(|image| image.record_id != record_id) {
            return Err(StorageError::Backend(format!("image {} belongs to record {}", foreign.id, foreign.record_id)));
        }
        let mut records = self.records.write().await;
        let record = records.entry(record_id.to_string()).or_default();
        Ok(std::mem::replace(&mut record.images, images))
    }

    async fn document(&self, record_id: &str) -> Result<Option<String>, StorageError> {
        Ok(self.records.read().await.get(record_id).and_then(|record| record.document.clone()))
    }

    async fn set_document(&self, record_id: &str, reference: String) -> Result<Option<String>, StorageError> {
        let mut records = self.records.write().await;
        let record = records.entry(record_id.to_string()).or_default();
        Ok(record.document.replace(reference))
    }
}
