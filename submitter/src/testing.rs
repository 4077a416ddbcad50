use std::{
    collections::HashMap,
    io::Cursor,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use common::{
    dtos::HealthDto,
    models::{ConversionParams, ConversionResult, HealthStatus, OutputFormat, PageArtifact},
};
use image::{DynamicImage, ImageOutputFormat, RgbImage};

use crate::{
    client::IConverterClient,
    error::SubmitError,
    models::Document,
    persistence::{IBlobStorage, InMemoryImageRepository, StorageError},
    submit::SubmitService,
};

pub const PDF: &[u8] = b"%PDF-1.7\n1 0 obj\n<<>>\nendobj\n%%EOF";

pub fn document() -> Document {
    Document::new("report.pdf", mime::APPLICATION_PDF, bytes::Bytes::from_static(PDF))
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(width, height)).write_to(&mut buffer, ImageOutputFormat::Png).unwrap();
    buffer.into_inner()
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(width, height)).write_to(&mut buffer, ImageOutputFormat::Jpeg(85)).unwrap();
    buffer.into_inner()
}

pub fn jpeg_page(page_number: u16, width: u32, height: u32) -> PageArtifact {
    let image = jpeg(width, height);
    PageArtifact {
        page_number,
        size_bytes: image.len(),
        image,
        format: OutputFormat::Jpeg,
        width,
        height,
    }
}

pub fn page(page_number: u16, width: u32, height: u32) -> PageArtifact {
    let image = png(width, height);
    PageArtifact {
        page_number,
        size_bytes: image.len(),
        image,
        format: OutputFormat::Png,
        width,
        height,
    }
}

/// A successful result with `count` pages; page N is 10 x (10 + N).
pub fn result(record_id: &str, count: u16) -> ConversionResult {
    let pages: Vec<_> = (1..=count).map(|n| page(n, 10, 10 + n as u32)).collect();
    ConversionResult {
        record_id: Some(record_id.to_string()),
        total_pages: pages.len(),
        pages,
        processing_time_ms: 5,
    }
}

type Outcome = Box<dyn Fn(&str) -> Result<ConversionResult, SubmitError> + Send + Sync>;

pub struct FakeConverter {
    outcome: Outcome,
    pub calls: AtomicUsize,
}

impl FakeConverter {
    pub fn with(outcome: impl Fn(&str) -> Result<ConversionResult, SubmitError> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(FakeConverter {
            outcome: Box::new(outcome),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn pages(count: u16) -> Arc<Self> {
        Self::with(move |record_id| Ok(result(record_id, count)))
    }

    pub fn failing(error: fn() -> SubmitError) -> Arc<Self> {
        Self::with(move |_| Err(error()))
    }
}

#[async_trait::async_trait]
impl IConverterClient for FakeConverter {
    async fn convert(&self, _document: &Document, record_id: &str, _params: &ConversionParams) -> Result<ConversionResult, SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.outcome)(record_id)
    }

    async fn health(&self) -> Result<HealthDto, SubmitError> {
        Ok(HealthDto {
            status: HealthStatus::Ready,
            name: "fake".to_string(),
            version: "0".to_string(),
        })
    }
}

/// Blob store that fails its `fail_on_put`-th put (1-based).
#[derive(Default)]
pub struct MemoryBlobStorage {
    pub blobs: Mutex<HashMap<String, Vec<u8>>>,
    puts: AtomicUsize,
    pub fail_on_put: Option<usize>,
}

impl MemoryBlobStorage {
    pub fn failing_on(put: usize) -> Arc<Self> {
        Arc::new(MemoryBlobStorage {
            fail_on_put: Some(put),
            ..Default::default()
        })
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.blobs.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait::async_trait]
impl IBlobStorage for MemoryBlobStorage {
    async fn put(&self, key: &str, content: Vec<u8>) -> Result<String, StorageError> {
        let put = self.puts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_put == Some(put) {
            return Err(StorageError::Backend("disk full".to_string()));
        }
        self.blobs.lock().unwrap().insert(key.to_string(), content);
        Ok(key.to_string())
    }

    async fn get(&self, reference: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.blobs.lock().unwrap().get(reference).cloned())
    }

    async fn delete(&self, reference: &str) -> Result<(), StorageError> {
        self.blobs.lock().unwrap().remove(reference);
        Ok(())
    }
}

pub struct Fixture {
    pub service: SubmitService,
    pub blobs: Arc<MemoryBlobStorage>,
    pub images: Arc<InMemoryImageRepository>,
}

pub fn fixture(converter: Arc<FakeConverter>, blobs: Arc<MemoryBlobStorage>) -> Fixture {
    let images = Arc::new(InMemoryImageRepository::default());
    let service = SubmitService::new(converter, blobs.clone(), images.clone(), ConversionParams::default());
    Fixture { service, blobs, images }
}
