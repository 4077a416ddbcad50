use std::{env, path::PathBuf, time::Duration};

use common::util::env::{get_optional, get_parsed, get_seconds, get_string};

pub struct WatermarkSettings {
    pub path: Option<PathBuf>,
    pub opacity: f32,
    pub scale: f32,
    pub center_scale: f32,
    pub spacing: (u32, u32),
}

/// Converter configuration, read once at startup.
pub struct ConverterSettings {
    pub port: u16,
    pub api_key: Option<String>,
    pub max_upload_bytes: usize,
    pub request_timeout: Duration,
    pub max_dpi: u16,
    pub jpeg_quality: u8,
    pub temp_root: PathBuf,
    pub sweep_interval: Duration,
    pub stale_after: Duration,
    pub pdfium_path: String,
    pub watermark: WatermarkSettings,
}

impl ConverterSettings {
    pub fn from_env() -> Self {
        ConverterSettings {
            port: get_parsed("PORT", 5000),
            api_key: get_optional("CONVERTER_API_KEY"),
            max_upload_bytes: get_parsed("MAX_UPLOAD_BYTES", 50 * 1024 * 1024),
            request_timeout: get_seconds("REQUEST_TIMEOUT_SECONDS", 59),
            max_dpi: get_parsed("MAX_DPI", 600),
            jpeg_quality: get_parsed::<u8>("JPEG_QUALITY", 85).clamp(1, 100),
            temp_root: get_optional("TEMP_ROOT").map(PathBuf::from).unwrap_or_else(|| env::temp_dir().join("converter")),
            sweep_interval: get_seconds("SWEEP_INTERVAL_SECONDS", 600),
            stale_after: get_seconds("STALE_AFTER_SECONDS", 60 * 60),
            pdfium_path: get_string("PDFIUM_PATH", "./"),
            watermark: WatermarkSettings {
                path: get_optional("WATERMARK_PATH").map(PathBuf::from),
                opacity: get_parsed::<f32>("WATERMARK_OPACITY", 0.5).clamp(0.0, 1.0),
                scale: get_parsed::<f32>("WATERMARK_SCALE", 0.25).clamp(0.01, 1.0),
                center_scale: get_parsed::<f32>("WATERMARK_CENTER_SCALE", 0.35).clamp(0.15, 0.5),
                spacing: (get_parsed::<u32>("WATERMARK_SPACING_X", 320).max(1), get_parsed::<u32>("WATERMARK_SPACING_Y", 380).max(1)),
            },
        }
    }
}
