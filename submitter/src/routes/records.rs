use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use common::consts::{DOCUMENT_FIELD, DPI_FIELD, FORMAT_FIELD};
use common::models::{ConversionParams, OutputFormat};
use common::util::mime::get_content_type;
use tracing::{debug, error, info, warn};

use crate::dtos::{RecordImagesDto, StoredImageDto, SubmitErrorDto};
use crate::error::SubmitError;
use crate::models::Document;
use crate::state::Services;

type Failure = (StatusCode, Json<SubmitErrorDto>);

pub fn create_route(services: Services) -> Router {
    Router::new()
        .route("/records/:record_id/document", post(upload_document))
        .route("/records/:record_id/images", get(list_images))
        .route("/records/:record_id/images/:image_id", get(image_content))
        .with_state(services)
}

/// Keeps the upload on the record, converts it and answers with the record's new page images.
#[tracing::instrument(skip(services, multipart))]
pub async fn upload_document(
    State(services): State<Services>, Path(record_id): Path<String>, multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RecordImagesDto>, Failure> {
    let submit_service = &services.submit_service;
    let form = match multipart {
        Ok(multipart) => UploadForm::read(multipart, services.max_upload_bytes).await,
        Err(rejection) => Err(SubmitError::RejectedInput(rejection.to_string())),
    };
    let (document, params) = form.and_then(|form| form.into_request(submit_service.defaults())).map_err(|err| failure(&record_id, err))?;

    info!("Received {} ({} bytes) for record {}", &document.file_name, document.size(), &record_id);
    submit_service.store_document(&record_id, &document).await.map_err(|err| failure(&record_id, err))?;
    let result = submit_service.submit(&document, &record_id, Some(params)).await.map_err(|err| failure(&record_id, err))?;
    let images = submit_service.stored_images(&record_id).await.map_err(|err| failure(&record_id, err))?;

    Ok(Json(RecordImagesDto {
        record_id,
        processing_time_ms: Some(result.processing_time_ms),
        images: images.iter().map(StoredImageDto::from).collect(),
    }))
}

pub async fn list_images(State(services): State<Services>, Path(record_id): Path<String>) -> Result<Json<RecordImagesDto>, Failure> {
    let images = services.submit_service.stored_images(&record_id).await.map_err(|err| failure(&record_id, err))?;
    Ok(Json(RecordImagesDto {
        record_id,
        processing_time_ms: None,
        images: images.iter().map(StoredImageDto::from).collect(),
    }))
}

pub async fn image_content(State(services): State<Services>, Path((record_id, image_id)): Path<(String, String)>) -> Response {
    match services.submit_service.image_content(&record_id, &image_id).await {
        Ok(Some((image, content))) => ([(header::CONTENT_TYPE, image.format.mime().to_string())], content).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => failure(&record_id, err).into_response(),
    }
}

fn failure(record_id: &str, err: SubmitError) -> Failure {
    let status = err.status();
    if status.is_client_error() {
        warn!("Rejected upload for record {}: {}", record_id, &err);
    } else {
        error!("Upload for record {} failed: {}", record_id, &err);
    }
    (status, Json(SubmitErrorDto::new(record_id, &err)))
}

#[derive(Default)]
struct UploadForm {
    document: Option<Document>,
    dpi: Option<String>,
    format: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart, limit: usize) -> Result<Self, SubmitError> {
        let body_error = move |err: MultipartError| invalid_body(err, limit);
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await.map_err(body_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                DOCUMENT_FIELD => {
                    let file_name = field.file_name().unwrap_or("document.pdf").to_string();
                    let content_type = get_content_type(field.content_type(), &file_name);
                    let content: Bytes = field.bytes().await.map_err(body_error)?;
                    form.document = Some(Document::new(file_name, content_type, content));
                }
                DPI_FIELD => form.dpi = Some(field.text().await.map_err(body_error)?),
                FORMAT_FIELD => form.format = Some(field.text().await.map_err(body_error)?),
                _ => debug!("Ignoring form field '{}'", name),
            }
        }
        Ok(form)
    }

    fn into_request(self, defaults: ConversionParams) -> Result<(Document, ConversionParams), SubmitError> {
        let dpi = match self.dpi.as_deref().map(str::trim) {
            None | Some("") => defaults.dpi,
            Some(dpi) => dpi
                .parse::<u16>()
                .ok()
                .filter(|dpi| *dpi > 0)
                .ok_or_else(|| SubmitError::RejectedInput("dpi must be a positive integer".to_string()))?,
        };
        let format = match self.format.as_deref().map(str::trim) {
            None | Some("") => defaults.format,
            Some(format) => format.parse::<OutputFormat>().map_err(|e| SubmitError::RejectedInput(e.to_string()))?,
        };
        let document = self.document.ok_or_else(|| SubmitError::RejectedInput("no document uploaded".to_string()))?;
        if document.size() == 0 {
            return Err(SubmitError::RejectedInput("uploaded document is empty".to_string()));
        }
        Ok((document, ConversionParams { dpi, format }))
    }
}

fn invalid_body(err: MultipartError, limit: usize) -> SubmitError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return SubmitError::TooLarge(format!("document exceeds {} bytes", limit));
    }
    SubmitError::RejectedInput(err.to_string())
}
