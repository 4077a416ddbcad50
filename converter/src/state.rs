use std::sync::Arc;

use crate::{
    convert::ConvertService,
    rasterize::{init_pdfium, PdfiumRasterizer},
    settings::ConverterSettings,
    watermark::build_watermark,
};

pub type Services = Arc<ServiceCollection>;

pub struct ServiceCollection {
    pub convert_service: Arc<ConvertService>,
    pub api_key: Option<String>,
    pub max_upload_bytes: usize,
}

impl ServiceCollection {
    pub fn build(settings: &ConverterSettings) -> Result<Arc<Self>, &'static str> {
        let pdfium = init_pdfium(&settings.pdfium_path)?;
        let convert_service = Arc::new(ConvertService {
            rasterizer: Arc::new(PdfiumRasterizer { pdfium }),
            watermark: build_watermark(&settings.watermark),
            temp_root: settings.temp_root.clone(),
            max_dpi: settings.max_dpi,
            jpeg_quality: settings.jpeg_quality,
        });
        Ok(Arc::new(ServiceCollection {
            convert_service,
            api_key: settings.api_key.clone(),
            max_upload_bytes: settings.max_upload_bytes,
        }))
    }
}
