use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use common::consts::{API_KEY_HEADER, DEFAULT_DPI, DOCUMENT_FIELD, DPI_FIELD, FORMAT_FIELD, PROCESS_ROUTE, RECORD_ID_FIELD};
use common::dtos::ProcessResponseDto;
use common::models::{ConversionParams, OutputFormat};
use tracing::{debug, error, info, warn};

use crate::error::ConvertError;
use crate::state::Services;

pub fn create_route(services: Services) -> Router {
    Router::new().route(PROCESS_ROUTE, post(process)).with_state(services)
}

#[tracing::instrument(skip(services, headers, multipart))]
pub async fn process(State(services): State<Services>, headers: HeaderMap, multipart: Result<Multipart, MultipartRejection>) -> (StatusCode, Json<ProcessResponseDto>) {
    if let Err(err) = authorize(services.api_key.as_deref(), &headers) {
        return failure(None, err);
    }
    let form = match multipart {
        Ok(multipart) => ProcessForm::read(multipart, services.max_upload_bytes).await,
        Err(rejection) => Err(ConvertError::InvalidParameter {
            name: "body",
            reason: rejection.to_string(),
        }),
    };
    let form = match form {
        Ok(form) => form,
        Err(err) => return failure(None, err),
    };

    let record_id = form.record_id.clone();
    info!("Processing document for record {:?}", &record_id);
    let result = match form.into_request() {
        Ok((document, params)) => services.convert_service.process(record_id.clone(), document, params).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(result) => (StatusCode::OK, Json(ProcessResponseDto::Success(result))),
        Err(err) => failure(record_id, err),
    }
}

fn authorize(api_key: Option<&str>, headers: &HeaderMap) -> Result<(), ConvertError> {
    let Some(expected) = api_key else {
        return Ok(());
    };
    match headers.get(API_KEY_HEADER).and_then(|value| value.to_str().ok()) {
        Some(provided) if provided == expected => Ok(()),
        _ => Err(ConvertError::Unauthorized),
    }
}

fn failure(record_id: Option<String>, err: ConvertError) -> (StatusCode, Json<ProcessResponseDto>) {
    let status = err.status();
    if status.is_client_error() {
        warn!("Rejected document for record {:?}: {}", &record_id, &err);
    } else {
        error!("Failed document for record {:?}: {}", &record_id, &err);
    }
    (status, Json(ProcessResponseDto::error(record_id, err.code(), err.to_string())))
}

#[derive(Default)]
struct ProcessForm {
    record_id: Option<String>,
    document: Option<Bytes>,
    dpi: Option<String>,
    format: Option<String>,
}

impl ProcessForm {
    async fn read(mut multipart: Multipart, limit: usize) -> Result<Self, ConvertError> {
        let body_error = move |err: MultipartError| invalid_body(err, limit);
        let mut form = ProcessForm::default();
        while let Some(field) = multipart.next_field().await.map_err(body_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                DOCUMENT_FIELD => form.document = Some(field.bytes().await.map_err(body_error)?),
                RECORD_ID_FIELD => form.record_id = Some(field.text().await.map_err(body_error)?).filter(|id| !id.trim().is_empty()),
                DPI_FIELD => form.dpi = Some(field.text().await.map_err(body_error)?),
                FORMAT_FIELD => form.format = Some(field.text().await.map_err(body_error)?),
                _ => debug!("Ignoring form field '{}'", name),
            }
        }
        Ok(form)
    }

    fn into_request(self) -> Result<(Bytes, ConversionParams), ConvertError> {
        let dpi = match self.dpi.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_DPI,
            Some(dpi) => dpi.parse::<u16>().map_err(|_| ConvertError::InvalidParameter {
                name: "dpi",
                reason: "must be a positive integer".to_string(),
            })?,
        };
        let format = match self.format.as_deref().map(str::trim) {
            None | Some("") => OutputFormat::default(),
            Some(format) => format.parse::<OutputFormat>().map_err(|e| ConvertError::InvalidParameter {
                name: "format",
                reason: e.to_string(),
            })?,
        };
        let document = self.document.ok_or(ConvertError::MissingDocument)?;
        Ok((document, ConversionParams { dpi, format }))
    }
}

fn invalid_body(err: MultipartError, limit: usize) -> ConvertError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ConvertError::TooLarge { limit };
    }
    ConvertError::InvalidParameter {
        name: "body",
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::convert::tests::{service, FakeRasterizer, PDF};
    use crate::routes::create_router;
    use crate::state::ServiceCollection;

    const BOUNDARY: &str = "converter-test-boundary";

    fn router(rasterizer: FakeRasterizer, api_key: Option<&str>, temp_root: &std::path::Path, timeout: Duration) -> Router {
        limited_router(rasterizer, api_key, temp_root, timeout, 1024 * 1024)
    }

    fn limited_router(rasterizer: FakeRasterizer, api_key: Option<&str>, temp_root: &std::path::Path, timeout: Duration, max_upload_bytes: usize) -> Router {
        let services = Arc::new(ServiceCollection {
            convert_service: Arc::new(service(Arc::new(rasterizer), temp_root)),
            api_key: api_key.map(str::to_string),
            max_upload_bytes,
        });
        create_router(services, timeout)
    }

    fn multipart_body(fields: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            if *name == DOCUMENT_FIELD {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"; filename=\"upload.pdf\"\r\nContent-Type: application/octet-stream\r\n\r\n", name).as_bytes(),
                );
            } else {
                body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes());
            }
            body.extend_from_slice(value);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn request(fields: &[(&str, &[u8])], api_key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(PROCESS_ROUTE)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY));
        if let Some(api_key) = api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }
        builder.body(Body::from(multipart_body(fields))).unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn converts_three_page_document() {
        let root = tempfile::tempdir().unwrap();
        let router = router(FakeRasterizer::pages(3), None, root.path(), Duration::from_secs(10));
        let (status, json) = send(router, request(&[(RECORD_ID_FIELD, &b"17"[..]), (DPI_FIELD, &b"200"[..]), (FORMAT_FIELD, &b"png"[..]), (DOCUMENT_FIELD, PDF)], None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["recordId"], "17");
        assert_eq!(json["totalPages"], 3);
        let pages = json["pages"].as_array().unwrap();
        assert_eq!(pages.iter().map(|page| page["pageNum"].as_u64().unwrap()).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(pages.iter().all(|page| page["format"] == "png"));
        assert!(json["processingTimeMs"].is_u64());
    }

    #[tokio::test]
    async fn defaults_apply_without_parameters() {
        let root = tempfile::tempdir().unwrap();
        let router = router(FakeRasterizer::pages(1), None, root.path(), Duration::from_secs(10));
        let (status, json) = send(router, request(&[(DOCUMENT_FIELD, PDF)], None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["pages"][0]["format"], "png");
        assert_eq!(json["pages"][0]["width"], 20);
        assert!(json["recordId"].is_null());
    }

    #[tokio::test]
    async fn plain_text_is_rejected_as_invalid_input() {
        let root = tempfile::tempdir().unwrap();
        let router = router(FakeRasterizer::pages(1), None, root.path(), Duration::from_secs(10));
        let (status, json) = send(router, request(&[(RECORD_ID_FIELD, &b"5"[..]), (DOCUMENT_FIELD, &b"meeting notes, not a pdf"[..])], None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "error");
        assert_eq!(json["errorCode"], "INVALID_INPUT");
        assert_eq!(json["recordId"], "5");
    }

    #[tokio::test]
    async fn zero_page_document_is_invalid_input() {
        let root = tempfile::tempdir().unwrap();
        let router = router(FakeRasterizer::pages(0), None, root.path(), Duration::from_secs(10));
        let (status, json) = send(router, request(&[(DOCUMENT_FIELD, PDF)], None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errorCode"], "INVALID_INPUT");
        assert!(json.get("pages").is_none());
    }

    #[tokio::test]
    async fn missing_document_and_bad_parameters_are_rejected() {
        let root = tempfile::tempdir().unwrap();
        let cases: Vec<Vec<(&str, &[u8])>> = vec![
            vec![(RECORD_ID_FIELD, &b"1"[..])],
            vec![(DPI_FIELD, &b"high"[..]), (DOCUMENT_FIELD, PDF)],
            vec![(DPI_FIELD, &b"-3"[..]), (DOCUMENT_FIELD, PDF)],
            vec![(FORMAT_FIELD, &b"tiff"[..]), (DOCUMENT_FIELD, PDF)],
        ];
        for fields in cases {
            let router = router(FakeRasterizer::pages(1), None, root.path(), Duration::from_secs(10));
            let (status, json) = send(router, request(&fields, None)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["errorCode"], "INVALID_INPUT");
        }
    }

    #[tokio::test]
    async fn non_multipart_body_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let router = router(FakeRasterizer::pages(1), None, root.path(), Duration::from_secs(10));
        let request = Request::builder()
            .method("POST")
            .uri(PROCESS_ROUTE)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, json) = send(router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errorCode"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_as_too_large() {
        let root = tempfile::tempdir().unwrap();
        let router = limited_router(FakeRasterizer::pages(1), None, root.path(), Duration::from_secs(10), 1024);
        let mut document = PDF.to_vec();
        document.resize(4096, b' ');
        let (status, json) = send(router, request(&[(RECORD_ID_FIELD, &b"8"[..]), (DOCUMENT_FIELD, &document[..])], None)).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["errorCode"], "INVALID_INPUT");
        assert_eq!(json["error"], "Document exceeds 1024 bytes");
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn page_failure_is_internal_fault() {
        let root = tempfile::tempdir().unwrap();
        let mut rasterizer = FakeRasterizer::pages(3);
        rasterizer.fail_on = Some(3);
        let router = router(rasterizer, None, root.path(), Duration::from_secs(10));
        let (status, json) = send(router, request(&[(DOCUMENT_FIELD, PDF)], None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["errorCode"], "INTERNAL_FAULT");
        assert!(json.get("pages").is_none());
    }

    #[tokio::test]
    async fn shared_secret_is_enforced() {
        let root = tempfile::tempdir().unwrap();
        let fields: &[(&str, &[u8])] = &[(DOCUMENT_FIELD, PDF)];

        let (status, json) = send(router(FakeRasterizer::pages(1), Some("s3cret"), root.path(), Duration::from_secs(10)), request(fields, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["errorCode"], "UNAUTHORIZED");

        let (status, _) = send(router(FakeRasterizer::pages(1), Some("s3cret"), root.path(), Duration::from_secs(10)), request(fields, Some("wrong"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, json) = send(router(FakeRasterizer::pages(1), Some("s3cret"), root.path(), Duration::from_secs(10)), request(fields, Some("s3cret"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
    }

    #[tokio::test]
    async fn slow_processing_exceeds_deadline() {
        let root = tempfile::tempdir().unwrap();
        let mut rasterizer = FakeRasterizer::pages(1);
        rasterizer.delay = Some(Duration::from_millis(500));
        let router = router(rasterizer, None, root.path(), Duration::from_millis(50));
        let (status, json) = send(router, request(&[(DOCUMENT_FIELD, PDF)], None)).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(json["errorCode"], "EXCEEDED_DEADLINE");
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn health_reports_ready() {
        let root = tempfile::tempdir().unwrap();
        let router = router(FakeRasterizer::pages(1), None, root.path(), Duration::from_secs(10));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ready");
        assert_eq!(json["name"], "converter");
    }
}
