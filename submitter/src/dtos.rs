use chrono::{DateTime, Utc};
use common::models::{ErrorCode, HealthStatus, OutputFormat};
use serde::{Deserialize, Serialize};

use crate::{error::SubmitError, models::StoredImage};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImageDto {
    pub id: String,
    pub page_number: u16,
    pub label: String,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub created: DateTime<Utc>,
    #[serde(rename = "_links")]
    pub _links: ImageLinks,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub content: String,
}

impl From<&StoredImage> for StoredImageDto {
    fn from(image: &StoredImage) -> Self {
        StoredImageDto {
            id: image.id.clone(),
            page_number: image.page_number,
            label: image.label.clone(),
            format: image.format,
            width: image.width,
            height: image.height,
            created: image.created,
            _links: ImageLinks {
                content: image_route(&image.record_id, &image.id),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordImagesDto {
    pub record_id: String,
    pub processing_time_ms: Option<u64>,
    pub images: Vec<StoredImageDto>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitErrorDto {
    pub record_id: String,
    pub error: String,
    pub error_code: ErrorCode,
    pub detail: String,
    pub retryable: bool,
}

impl SubmitErrorDto {
    pub fn new(record_id: &str, err: &SubmitError) -> Self {
        SubmitErrorDto {
            record_id: record_id.to_string(),
            error: err.user_message().to_string(),
            error_code: err.code(),
            detail: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitterHealthDto {
    pub status: HealthStatus,
    pub converter: HealthStatus,
}

pub fn image_route(record_id: &str, image_id: &str) -> String {
    format!("/records/{}/images/{}", record_id, image_id)
}
