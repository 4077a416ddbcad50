use axum::http::StatusCode;
use common::models::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("No document provided")]
    MissingDocument,

    #[error("Document is empty")]
    EmptyDocument,

    #[error("Document is not a PDF")]
    NotAPdf,

    #[error("Document could not be opened: {0}")]
    CorruptDocument(String),

    #[error("Document has no pages")]
    NoPages,

    #[error("Document exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Missing or invalid API key")]
    Unauthorized,

    #[error("Failed to process page {page}: {detail}")]
    PageFailed { page: u16, detail: String },

    #[error("Processing failed: {0}")]
    Internal(String),
}

impl ConvertError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConvertError::MissingDocument
            | ConvertError::EmptyDocument
            | ConvertError::NotAPdf
            | ConvertError::CorruptDocument(_)
            | ConvertError::NoPages
            | ConvertError::TooLarge { .. }
            | ConvertError::InvalidParameter { .. } => ErrorCode::InvalidInput,
            ConvertError::Unauthorized => ErrorCode::Unauthorized,
            ConvertError::PageFailed { .. } | ConvertError::Internal(_) => ErrorCode::InternalFault,
        }
    }

    pub fn status(&self) -> StatusCode {
        if let ConvertError::TooLarge { .. } = self {
            return StatusCode::PAYLOAD_TOO_LARGE;
        }
        match self.code() {
            ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::ExceededDeadline => StatusCode::GATEWAY_TIMEOUT,
            ErrorCode::Unreachable => StatusCode::BAD_GATEWAY,
            ErrorCode::InternalFault => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<&'static str> for ConvertError {
    fn from(err: &'static str) -> Self {
        ConvertError::Internal(err.to_string())
    }
}
