use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use bytes::Bytes;
use common::{
    models::{ConversionParams, ConversionResult, PageArtifact},
    persistence::tempfiles::TempJobFileProvider,
    util::mime::is_pdf,
};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::{encode::encode_page, error::ConvertError, rasterize::IRasterizer, watermark::IWatermarkService};

pub struct ConvertService {
    pub rasterizer: Arc<dyn IRasterizer>,
    pub watermark: Arc<dyn IWatermarkService>,
    pub temp_root: PathBuf,
    pub max_dpi: u16,
    pub jpeg_quality: u8,
}

impl ConvertService {
    /// Converts a whole document or fails; never returns a partial page list.
    #[tracing::instrument(skip(self, document), fields(size = document.len()))]
    pub async fn process(&self, record_id: Option<String>, document: Bytes, params: ConversionParams) -> Result<ConversionResult, ConvertError> {
        let start = Instant::now();
        self.validate(&document, &params)?;

        let job_files = TempJobFileProvider::build(&self.temp_root).await?;
        let pages = self.render(&job_files, document, params).await;
        job_files.clean_up().await;
        let pages = pages?;

        let result = ConversionResult {
            record_id,
            total_pages: pages.len(),
            pages,
            processing_time_ms: start.elapsed().as_millis() as u64,
        };
        result.check_pages().map_err(ConvertError::Internal)?;
        info!("Processed {} pages in {}ms", result.total_pages, result.processing_time_ms);
        Ok(result)
    }

    fn validate(&self, document: &Bytes, params: &ConversionParams) -> Result<(), ConvertError> {
        if params.dpi == 0 || params.dpi > self.max_dpi {
            return Err(ConvertError::InvalidParameter {
                name: "dpi",
                reason: format!("must be between 1 and {}", self.max_dpi),
            });
        }
        if document.is_empty() {
            return Err(ConvertError::EmptyDocument);
        }
        if !is_pdf(document) {
            return Err(ConvertError::NotAPdf);
        }
        Ok(())
    }

    async fn render(&self, job_files: &TempJobFileProvider, document: Bytes, params: ConversionParams) -> Result<Vec<PageArtifact>, ConvertError> {
        let path = job_files.get_path().with_extension("pdf");
        debug!("Rendering at {} dpi in {}", params.dpi, job_files.directory().display());
        fs::write(&path, &document).await.map_err(|e| ConvertError::Internal(format!("Could not store document: {}", e)))?;

        let rasterizer = self.rasterizer.clone();
        let watermark = self.watermark.clone();
        let jpeg_quality = self.jpeg_quality;
        tokio::task::spawn_blocking(move || render_pages(rasterizer.as_ref(), watermark.as_ref(), &path, params, jpeg_quality))
            .await
            .map_err(|e| {
                warn!("Render task failed: {}", e);
                ConvertError::Internal(format!("Render task panicked: {}", e))
            })?
    }
}

fn render_pages(rasterizer: &dyn IRasterizer, watermark: &dyn IWatermarkService, path: &Path, params: ConversionParams, jpeg_quality: u8) -> Result<Vec<PageArtifact>, ConvertError> {
    let mut pages = Vec::new();
    let total_pages = rasterizer.rasterize(path, params.dpi, &mut |page_number, image| {
        let marked = watermark.apply(image);
        let bytes = encode_page(&marked, params.format, jpeg_quality).map_err(|e| ConvertError::PageFailed {
            page: page_number,
            detail: e.to_string(),
        })?;
        info!("Processed page {}", page_number);
        pages.push(PageArtifact {
            page_number,
            format: params.format,
            width: marked.width(),
            height: marked.height(),
            size_bytes: bytes.len(),
            image: bytes,
        });
        Ok(())
    })?;
    if pages.is_empty() {
        return Err(ConvertError::NoPages);
    }
    if pages.len() != total_pages as usize {
        return Err(ConvertError::Internal(format!("Rendered {} of {} pages", pages.len(), total_pages)));
    }
    Ok(pages)
}
