use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{consts::DEFAULT_DPI, util::serialize::base64};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn mime(&self) -> mime::Mime {
        match self {
            OutputFormat::Png => mime::IMAGE_PNG,
            OutputFormat::Jpeg => mime::IMAGE_JPEG,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            _ => Err("format must be one of png, jpeg"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Png => write!(f, "png"),
            OutputFormat::Jpeg => write!(f, "jpeg"),
        }
    }
}

/// Per-call rendering parameters of a conversion request.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversionParams {
    pub dpi: u16,
    pub format: OutputFormat,
}

impl Default for ConversionParams {
    fn default() -> Self {
        ConversionParams {
            dpi: DEFAULT_DPI,
            format: OutputFormat::Png,
        }
    }
}

/// One rendered page. `image` travels base64 encoded.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageArtifact {
    #[serde(rename = "pageNum")]
    pub page_number: u16,
    #[serde(rename = "imageBase64", with = "base64")]
    pub image: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub size_bytes: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub record_id: Option<String>,
    pub total_pages: usize,
    pub pages: Vec<PageArtifact>,
    pub processing_time_ms: u64,
}

impl ConversionResult {
    /// Checks page count and numbering: exactly `total_pages` pages numbered 1..=N in order,
    /// each with positive dimensions and a payload matching its declared size.
    pub fn check_pages(&self) -> Result<(), String> {
        if self.pages.is_empty() {
            return Err("result contains no pages".to_string());
        }
        if self.pages.len() != self.total_pages {
            return Err(format!("result declares {} pages but contains {}", self.total_pages, self.pages.len()));
        }
        for (index, page) in self.pages.iter().enumerate() {
            let expected = index + 1;
            if page.page_number as usize != expected {
                return Err(format!("page {} found at position {}", page.page_number, expected));
            }
            if page.width == 0 || page.height == 0 {
                return Err(format!("page {} has empty dimensions", page.page_number));
            }
            if page.image.is_empty() || page.image.len() != page.size_bytes {
                return Err(format!("page {} declares {} bytes but carries {}", page.page_number, page.size_bytes, page.image.len()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversionFailure {
    pub record_id: Option<String>,
    pub error: String,
    pub error_code: super::ErrorCode,
}
