//! Liveness endpoint.

use utoipa_axum::{router::OpenApiRouter, routes};

/// Report that the service is up
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    operation_id = "getUsersHealth",
    responses(
        (status = 200, description = "Service is up", body = String)
    )
)]
pub async fn health() -> &'static str {
    "Success"
}

pub fn health_router() -> OpenApiRouter {
    OpenApiRouter::new().routes(routes!(health))
}
