use bytes::Bytes;
use chrono::{DateTime, Utc};
use common::{models::OutputFormat, util::random::generate_id};
use mime::Mime;
use serde::{Deserialize, Serialize};

/// An uploaded source document. Immutable once received.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub file_name: String,
    pub content_type: Mime,
    pub content: Bytes,
}

impl Document {
    pub fn new(file_name: impl Into<String>, content_type: Mime, content: Bytes) -> Self {
        Document {
            id: generate_id(),
            file_name: file_name.into(),
            content_type,
            content,
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Durable page image of a record. `content_ref` points into blob storage.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub id: String,
    pub record_id: String,
    pub page_number: u16,
    pub label: String,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub content_ref: String,
    pub created: DateTime<Utc>,
}

pub fn page_label(page_number: u16) -> String {
    format!("Page {}", page_number)
}
