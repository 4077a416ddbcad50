use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use common::consts::HEALTH_ROUTE;
use common::dtos::{RootDto, RootLinks};
use common::models::HealthStatus;
use tracing::warn;

use crate::dtos::SubmitterHealthDto;
use crate::state::Services;

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn create_route(services: Services) -> Router {
    Router::new().route("/", get(root_links)).route(HEALTH_ROUTE, get(health)).with_state(services)
}

pub async fn root_links() -> Json<RootDto<'static>> {
    Json(RootDto {
        version: VERSION,
        name: NAME,
        _links: RootLinks {
            health: HEALTH_ROUTE,
            process: None,
            records: Some("/records"),
        },
    })
}

/// Ready while the Converter answers its own health probe.
#[tracing::instrument(skip(services))]
pub async fn health(State(services): State<Services>) -> (StatusCode, Json<SubmitterHealthDto>) {
    match services.submit_service.converter().health().await {
        Ok(converter) => (
            StatusCode::OK,
            Json(SubmitterHealthDto {
                status: HealthStatus::Ready,
                converter: converter.status,
            }),
        ),
        Err(err) => {
            warn!("Converter health check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(SubmitterHealthDto {
                    status: HealthStatus::Ready,
                    converter: HealthStatus::Unreachable,
                }),
            )
        }
    }
}
