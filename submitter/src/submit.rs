use std::{io::Cursor, sync::Arc};

use chrono::Utc;
use common::{
    models::{ConversionParams, ConversionResult, OutputFormat, PageArtifact},
    util::random::generate_id,
};
use image::{io::Reader, ImageFormat};
use tracing::{info, warn};

use crate::{
    client::IConverterClient,
    error::SubmitError,
    models::{page_label, Document, StoredImage},
    persistence::{storage_segment, IBlobStorage, IImageRepository},
};

pub struct SubmitService {
    converter: Arc<dyn IConverterClient>,
    blobs: Arc<dyn IBlobStorage>,
    images: Arc<dyn IImageRepository>,
    defaults: ConversionParams,
}

impl SubmitService {
    pub fn new(converter: Arc<dyn IConverterClient>, blobs: Arc<dyn IBlobStorage>, images: Arc<dyn IImageRepository>, defaults: ConversionParams) -> Self {
        SubmitService {
            converter,
            blobs,
            images,
            defaults,
        }
    }

    pub fn defaults(&self) -> ConversionParams {
        self.defaults
    }

    pub fn converter(&self) -> &Arc<dyn IConverterClient> {
        &self.converter
    }

    /// Sends `document` to the Converter and replaces the record's page images with the result.
    ///
    /// The exchange is made once. On any error the record keeps its previous images.
    #[tracing::instrument(skip(self, document, params), fields(document = %document.id))]
    pub async fn submit(&self, document: &Document, record_id: &str, params: Option<ConversionParams>) -> Result<ConversionResult, SubmitError> {
        let params = params.unwrap_or(self.defaults);
        let result = self.converter.convert(document, record_id, &params).await.map_err(|err| {
            warn!("Conversion of record {} failed: {}", record_id, err);
            err
        })?;
        verify_result(&result, record_id, &params).map_err(|err| {
            warn!("Converter broke the response contract for record {}: {}", record_id, err);
            err
        })?;
        let stored = self.store_pages(record_id, &result).await?;
        info!("Stored {} pages for record {}", stored.len(), record_id);
        Ok(result)
    }

    /// Keeps the raw upload on the record before it is sent anywhere.
    pub async fn store_document(&self, record_id: &str, document: &Document) -> Result<String, SubmitError> {
        let key = format!("documents/{}/{}.pdf", storage_segment(record_id), document.id);
        let reference = self.blobs.put(&key, document.content.to_vec()).await?;
        if let Some(previous) = self.images.set_document(record_id, reference.clone()).await? {
            if let Err(err) = self.blobs.delete(&previous).await {
                warn!("Could not delete replaced document {}: {}", previous, err);
            }
        }
        Ok(reference)
    }

    pub async fn stored_images(&self, record_id: &str) -> Result<Vec<StoredImage>, SubmitError> {
        Ok(self.images.images(record_id).await?)
    }

    pub async fn image_content(&self, record_id: &str, image_id: &str) -> Result<Option<(StoredImage, Vec<u8>)>, SubmitError> {
        let Some(image) = self.images.images(record_id).await?.into_iter().find(|image| image.id == image_id) else {
            return Ok(None);
        };
        Ok(self.blobs.get(&image.content_ref).await?.map(|content| (image, content)))
    }

    async fn store_pages(&self, record_id: &str, result: &ConversionResult) -> Result<Vec<StoredImage>, SubmitError> {
        let segment = storage_segment(record_id);
        let created = Utc::now();
        let mut stored: Vec<StoredImage> = Vec::with_capacity(result.pages.len());
        for page in &result.pages {
            let id = generate_id();
            let key = format!("images/{}/{}.{}", segment, id, page.format.extension());
            match self.blobs.put(&key, page.image.clone()).await {
                Ok(content_ref) => stored.push(StoredImage {
                    id,
                    record_id: record_id.to_string(),
                    page_number: page.page_number,
                    label: page_label(page.page_number),
                    format: page.format,
                    width: page.width,
                    height: page.height,
                    content_ref,
                    created,
                }),
                Err(err) => {
                    self.discard(&stored, "partial batch").await;
                    return Err(err.into());
                }
            }
        }

        match self.images.replace_images(record_id, stored.clone()).await {
            Ok(previous) => {
                self.discard(&previous, "replaced image").await;
                Ok(stored)
            }
            Err(err) => {
                self.discard(&stored, "unsaved batch").await;
                Err(err.into())
            }
        }
    }

    async fn discard(&self, images: &[StoredImage], what: &str) {
        for image in images {
            if let Err(err) = self.blobs.delete(&image.content_ref).await {
                warn!("Could not delete {} {}: {}", what, image.content_ref, err);
            }
        }
    }
}

fn verify_result(result: &ConversionResult, record_id: &str, params: &ConversionParams) -> Result<(), SubmitError> {
    result.check_pages().map_err(SubmitError::ConverterFault)?;
    if let Some(echoed) = &result.record_id {
        if echoed != record_id {
            return Err(SubmitError::ConverterFault(format!("result belongs to record {}", echoed)));
        }
    }
    for page in &result.pages {
        if page.format != params.format {
            return Err(SubmitError::ConverterFault(format!("page {} is {} instead of {}", page.page_number, page.format, params.format)));
        }
        let (width, height) = decoded_dimensions(page)?;
        if (width, height) != (page.width, page.height) {
            return Err(SubmitError::ConverterFault(format!(
                "page {} declares {}x{} but decodes as {}x{}",
                page.page_number, page.width, page.height, width, height
            )));
        }
    }
    Ok(())
}

fn decoded_dimensions(page: &PageArtifact) -> Result<(u32, u32), SubmitError> {
    let undecodable = |e: std::io::Error| SubmitError::ConverterFault(format!("page {} is not an image: {}", page.page_number, e));
    let reader = Reader::new(Cursor::new(page.image.as_slice())).with_guessed_format().map_err(undecodable)?;
    let expected = match page.format {
        OutputFormat::Png => ImageFormat::Png,
        OutputFormat::Jpeg => ImageFormat::Jpeg,
    };
    if reader.format() != Some(expected) {
        return Err(SubmitError::ConverterFault(format!("page {} payload is not {}", page.page_number, page.format)));
    }
    reader
        .into_dimensions()
        .map_err(|e| SubmitError::ConverterFault(format!("page {} could not be decoded: {}", page.page_number, e)))
}
