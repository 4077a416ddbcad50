use std::sync::Arc;

use crate::{
    client::HttpConverterClient,
    persistence::{FileSystemBlobStorage, InMemoryImageRepository},
    settings::SubmitterSettings,
    submit::SubmitService,
};

pub type Services = Arc<ServiceCollection>;

pub struct ServiceCollection {
    pub submit_service: Arc<SubmitService>,
    pub max_upload_bytes: usize,
}

impl ServiceCollection {
    pub async fn build(settings: &SubmitterSettings) -> Result<Arc<Self>, &'static str> {
        let converter = Arc::new(HttpConverterClient::build(settings)?);
        let blobs = Arc::new(FileSystemBlobStorage::build(settings.storage_root.clone()).await?);
        let images = Arc::new(InMemoryImageRepository::default());
        Ok(Arc::new(ServiceCollection {
            submit_service: Arc::new(SubmitService::new(converter, blobs, images, settings.defaults)),
            max_upload_bytes: settings.max_upload_bytes,
        }))
    }
}
