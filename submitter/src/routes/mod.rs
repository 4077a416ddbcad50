use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;

use crate::state::Services;

pub mod records;
pub mod root;

pub fn create_router(services: Services) -> Router {
    let max_upload_bytes = services.max_upload_bytes;
    Router::new()
        .merge(root::create_route(services.clone()))
        .merge(records::create_route(services))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}
