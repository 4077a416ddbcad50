use std::time::Duration;

use common::{
    consts::{API_KEY_HEADER, DOCUMENT_FIELD, DPI_FIELD, FORMAT_FIELD, HEALTH_ROUTE, PROCESS_ROUTE, RECORD_ID_FIELD},
    dtos::{HealthDto, ProcessResponseDto},
    models::{ConversionParams, ConversionResult, ErrorCode},
};
use reqwest::{
    multipart::{Form, Part},
    StatusCode,
};
use tracing::{error, info, warn};

use crate::{error::SubmitError, models::Document, settings::SubmitterSettings};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Client side of the conversion exchange.
#[async_trait::async_trait]
pub trait IConverterClient: Send + Sync {
    async fn convert(&self, document: &Document, record_id: &str, params: &ConversionParams) -> Result<ConversionResult, SubmitError>;
    async fn health(&self) -> Result<HealthDto, SubmitError>;
}

pub struct HttpConverterClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpConverterClient {
    pub fn build(settings: &SubmitterSettings) -> Result<Self, &'static str> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.converter_connect_timeout.min(settings.converter_timeout))
            .timeout(settings.converter_timeout)
            .build()
            .map_err(|_| "Could not build converter client")?;
        Ok(HttpConverterClient {
            client,
            base_url: settings.converter_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            timeout: settings.converter_timeout,
        })
    }

    fn form(document: &Document, record_id: &str, params: &ConversionParams) -> Result<Form, SubmitError> {
        let part = Part::bytes(document.content.to_vec())
            .file_name(document.file_name.clone())
            .mime_str(document.content_type.as_ref())
            .map_err(|e| SubmitError::RejectedInput(format!("Invalid content type: {}", e)))?;
        Ok(Form::new()
            .text(RECORD_ID_FIELD, record_id.to_string())
            .text(DPI_FIELD, params.dpi.to_string())
            .text(FORMAT_FIELD, params.format.to_string())
            .part(DOCUMENT_FIELD, part))
    }

    fn transport_error(&self, err: reqwest::Error) -> SubmitError {
        if err.is_connect() {
            SubmitError::ServiceUnavailable(err.to_string())
        } else if err.is_timeout() {
            SubmitError::Timeout(format!("no response within {}s", self.timeout.as_secs()))
        } else {
            SubmitError::ServiceUnavailable(err.to_string())
        }
    }
}

#[async_trait::async_trait]
impl IConverterClient for HttpConverterClient {
    #[tracing::instrument(skip(self, document, params), fields(document = %document.id, size = document.size()))]
    async fn convert(&self, document: &Document, record_id: &str, params: &ConversionParams) -> Result<ConversionResult, SubmitError> {
        let mut request = self
            .client
            .post(format!("{}{}", self.base_url, PROCESS_ROUTE))
            .multipart(Self::form(document, record_id, params)?);
        if let Some(api_key) = &self.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        let result = interpret(status, &body)?;
        info!("Converter returned {} pages in {}ms", result.total_pages, result.processing_time_ms);
        Ok(result)
    }

    async fn health(&self) -> Result<HealthDto, SubmitError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, HEALTH_ROUTE))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        if !response.status().is_success() {
            return Err(SubmitError::ServiceUnavailable(format!("health returned {}", response.status())));
        }
        response.json::<HealthDto>().await.map_err(|e| SubmitError::ConverterFault(e.to_string()))
    }
}

/// Maps a Converter response onto the submit outcome.
///
/// A body that does not follow the wire contract is classified by HTTP status alone.
pub fn interpret(status: StatusCode, body: &[u8]) -> Result<ConversionResult, SubmitError> {
    match serde_json::from_slice::<ProcessResponseDto>(body) {
        Ok(ProcessResponseDto::Success(result)) if status.is_success() => Ok(result),
        Ok(ProcessResponseDto::Success(_)) => Err(SubmitError::ConverterFault(format!("success body with status {}", status))),
        Ok(ProcessResponseDto::Error(failure)) => {
            if failure.error_code.is_client_error() {
                warn!("Converter rejected the document: {}", failure.error);
            } else {
                error!("Converter reported {:?}: {}", failure.error_code, failure.error);
            }
            Err(match failure.error_code {
                ErrorCode::InvalidInput if status == StatusCode::PAYLOAD_TOO_LARGE => SubmitError::TooLarge(failure.error),
                ErrorCode::InvalidInput => SubmitError::RejectedInput(failure.error),
                ErrorCode::Unauthorized => SubmitError::Unauthorized(failure.error),
                ErrorCode::InternalFault => SubmitError::ConverterFault(failure.error),
                ErrorCode::Unreachable => SubmitError::ServiceUnavailable(failure.error),
                ErrorCode::ExceededDeadline => SubmitError::Timeout(failure.error),
            })
        }
        Err(err) => {
            warn!("Unreadable converter response ({}): {}", status, err);
            Err(match status {
                StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => SubmitError::Timeout(format!("converter returned {}", status)),
                StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => SubmitError::ServiceUnavailable(format!("converter returned {}", status)),
                StatusCode::PAYLOAD_TOO_LARGE => SubmitError::TooLarge(format!("converter returned {}", status)),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SubmitError::Unauthorized(format!("converter returned {}", status)),
                status if status.is_client_error() => SubmitError::RejectedInput(format!("converter returned {}", status)),
                _ => SubmitError::ConverterFault(format!("malformed response: {}", err)),
            })
        }
    }
}
