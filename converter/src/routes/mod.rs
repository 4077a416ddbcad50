use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, extract::DefaultBodyLimit, http::StatusCode, BoxError, Json, Router};
use common::{dtos::ProcessResponseDto, models::ErrorCode};
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::trace::TraceLayer;

use crate::state::Services;

pub mod process;
pub mod root;

pub fn create_router(services: Services, request_timeout: Duration) -> Router {
    let max_upload_bytes = services.max_upload_bytes;
    Router::new()
        .merge(root::create_route())
        .merge(process::create_route(services))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(HandleErrorLayer::new(handle_timeout))
                .layer(TimeoutLayer::new(request_timeout)),
        )
}

async fn handle_timeout(_: BoxError) -> (StatusCode, Json<ProcessResponseDto>) {
    (
        StatusCode::GATEWAY_TIMEOUT,
        Json(ProcessResponseDto::error(None, ErrorCode::ExceededDeadline, "Processing exceeded the server deadline")),
    )
}
