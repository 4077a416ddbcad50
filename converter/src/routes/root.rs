use axum::routing::get;
use axum::{Json, Router};
use common::consts::{HEALTH_ROUTE, PROCESS_ROUTE};
use common::dtos::{HealthDto, RootDto, RootLinks};
use common::models::HealthStatus;

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn create_route() -> Router {
    Router::new().route("/", get(root_links)).route(HEALTH_ROUTE, get(health))
}

pub async fn root_links() -> Json<RootDto<'static>> {
    Json(RootDto {
        version: VERSION,
        name: NAME,
        _links: RootLinks {
            health: HEALTH_ROUTE,
            process: Some(PROCESS_ROUTE),
            records: None,
        },
    })
}

#[tracing::instrument]
pub async fn health() -> Json<HealthDto> {
    Json(HealthDto {
        status: HealthStatus::Ready,
        name: NAME.to_string(),
        version: VERSION.to_string(),
    })
}
