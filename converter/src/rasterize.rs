use std::path::Path;

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

use crate::error::ConvertError;

const POINTS_PER_INCH: f32 = 72.0;

#[cfg(feature = "static")]
pub fn init_pdfium(_path: &str) -> Result<Pdfium, &'static str> {
    Ok(Pdfium::new(Pdfium::bind_to_statically_linked_library().map_err(|_| "Could not init pdfium")?))
}

#[cfg(not(feature = "static"))]
pub fn init_pdfium(path: &str) -> Result<Pdfium, &'static str> {
    Ok(Pdfium::new(Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path)).map_err(|_| "Could not init pdfium")?))
}

/// Turns a document on disk into page images.
///
/// Blocking; call from `spawn_blocking`. Pages are handed to `on_page` in ascending order,
/// numbered from 1. Returns the page count of the document.
pub trait IRasterizer: Send + Sync {
    fn rasterize(&self, path: &Path, dpi: u16, on_page: &mut dyn FnMut(u16, DynamicImage) -> Result<(), ConvertError>) -> Result<u16, ConvertError>;
}

pub struct PdfiumRasterizer {
    pub pdfium: Pdfium,
}

impl IRasterizer for PdfiumRasterizer {
    fn rasterize(&self, path: &Path, dpi: u16, on_page: &mut dyn FnMut(u16, DynamicImage) -> Result<(), ConvertError>) -> Result<u16, ConvertError> {
        let document = self.pdfium.load_pdf_from_file(path, None).map_err(|e| ConvertError::CorruptDocument(format!("{:?}", e)))?;
        let pages = document.pages();
        let total_pages = pages.len();
        info!("Document has {} pages", total_pages);
        if total_pages == 0 {
            return Err(ConvertError::NoPages);
        }

        let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / POINTS_PER_INCH);
        for (index, page) in pages.iter().enumerate() {
            let page_number = index as u16 + 1;
            let image = page
                .render_with_config(&render_config)
                .map_err(|e| ConvertError::PageFailed {
                    page: page_number,
                    detail: format!("{:?}", e),
                })?
                .as_image();
            debug!("Rendered page {} -> {}x{} px", page_number, image.width(), image.height());
            on_page(page_number, image)?;
        }
        Ok(total_pages)
    }
}
