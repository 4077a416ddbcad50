use serde::{Deserialize, Serialize};

use crate::models::{ConversionFailure, ConversionResult, ErrorCode};

/// Body of every `/process` response, tagged by `status`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "status")]
pub enum ProcessResponseDto {
    #[serde(rename = "success")]
    Success(ConversionResult),
    #[serde(rename = "error")]
    Error(ConversionFailure),
}

impl ProcessResponseDto {
    pub fn error(record_id: Option<String>, error_code: ErrorCode, error: impl Into<String>) -> Self {
        ProcessResponseDto::Error(ConversionFailure {
            record_id,
            error: error.into(),
            error_code,
        })
    }
}
