use std::{path::PathBuf, time::Duration};

use common::{
    consts::DEFAULT_DPI,
    models::{ConversionParams, OutputFormat},
    util::env::{get_optional, get_parsed, get_seconds, get_string},
};
use tracing::warn;

/// Submitter configuration, read once at startup.
pub struct SubmitterSettings {
    pub port: u16,
    pub converter_url: String,
    pub converter_timeout: Duration,
    pub converter_connect_timeout: Duration,
    pub defaults: ConversionParams,
    pub api_key: Option<String>,
    pub storage_root: PathBuf,
    pub max_upload_bytes: usize,
}

impl SubmitterSettings {
    pub fn from_env() -> Self {
        SubmitterSettings {
            port: get_parsed("PORT", 8000),
            converter_url: get_string("CONVERTER_URL", "http://localhost:5000"),
            converter_timeout: get_seconds("CONVERTER_TIMEOUT_SECONDS", 120),
            converter_connect_timeout: get_seconds("CONVERTER_CONNECT_TIMEOUT_SECONDS", 10),
            defaults: ConversionParams {
                dpi: get_parsed("CONVERTER_DPI", DEFAULT_DPI).max(1),
                format: get_format(),
            },
            api_key: get_optional("CONVERTER_API_KEY"),
            storage_root: PathBuf::from(get_string("STORAGE_ROOT", "./storage")),
            max_upload_bytes: get_parsed("MAX_UPLOAD_BYTES", 50 * 1024 * 1024),
        }
    }
}

fn get_format() -> OutputFormat {
    let format = get_string("CONVERTER_FORMAT", "png");
    format.parse().unwrap_or_else(|err| {
        warn!("Ignoring CONVERTER_FORMAT '{}': {}", format, err);
        OutputFormat::default()
    })
}
