use axum::http::StatusCode;
use common::models::ErrorCode;
use thiserror::Error;

use crate::persistence::StorageError;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Converter rejected the document: {0}")]
    RejectedInput(String),

    #[error("Document too large: {0}")]
    TooLarge(String),

    #[error("Converter refused the shared secret: {0}")]
    Unauthorized(String),

    #[error("Converter failed to process the document: {0}")]
    ConverterFault(String),

    #[error("Converter unreachable: {0}")]
    ServiceUnavailable(String),

    #[error("Converter did not answer in time: {0}")]
    Timeout(String),

    #[error("Could not store converted pages: {0}")]
    Storage(#[from] StorageError),
}

impl SubmitError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SubmitError::RejectedInput(_) | SubmitError::TooLarge(_) => ErrorCode::InvalidInput,
            SubmitError::Unauthorized(_) => ErrorCode::Unauthorized,
            SubmitError::ConverterFault(_) | SubmitError::Storage(_) => ErrorCode::InternalFault,
            SubmitError::ServiceUnavailable(_) => ErrorCode::Unreachable,
            SubmitError::Timeout(_) => ErrorCode::ExceededDeadline,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SubmitError::RejectedInput(_) => StatusCode::BAD_REQUEST,
            SubmitError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            SubmitError::Unauthorized(_) | SubmitError::ConverterFault(_) => StatusCode::BAD_GATEWAY,
            SubmitError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SubmitError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            SubmitError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the person who uploaded the document.
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmitError::RejectedInput(_) => "The file is not a readable PDF or the conversion settings are invalid. Check the file and upload it again.",
            SubmitError::TooLarge(_) => "The file is too large to convert. Upload a smaller document.",
            SubmitError::Unauthorized(_) => "The conversion service refused this server's credentials. Contact the operator.",
            SubmitError::ConverterFault(_) => "The conversion service failed while processing the document. Try again later.",
            SubmitError::ServiceUnavailable(_) => "The conversion service cannot be reached. Contact the operator.",
            SubmitError::Timeout(_) => "The conversion took too long. Try a smaller document or try again later.",
            SubmitError::Storage(_) => "The converted pages could not be saved. Existing images were left unchanged.",
        }
    }

    /// Whether uploading the same document again may succeed without anything else changing.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubmitError::ConverterFault(_) | SubmitError::ServiceUnavailable(_) | SubmitError::Timeout(_) | SubmitError::Storage(_)
        )
    }
}
