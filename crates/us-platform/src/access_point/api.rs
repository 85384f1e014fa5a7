//! Access Points API

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::access_point::entity::{AccessPoint, AccessPointPayload};
use crate::access_point::service::AccessPointService;
use crate::shared::api_common::{parse_numeric_id, SuccessResponse};
use crate::shared::error::PlatformError;

#[derive(Clone)]
pub struct AccessPointsState {
    pub access_points: Arc<AccessPointService>,
}

/// List access points
#[utoipa::path(
    get,
    path = "/",
    tag = "access-points",
    operation_id = "getUsersAccessPoints",
    responses(
        (status = 200, description = "All access points", body = Vec<AccessPoint>)
    )
)]
pub async fn list_access_points(
    State(state): State<AccessPointsState>,
) -> Result<Json<Vec<AccessPoint>>, PlatformError> {
    Ok(Json(state.access_points.list().await?))
}

/// Get access point by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "access-points",
    operation_id = "getUsersAccessPointsById",
    params(("id" = i64, Path, description = "Access point id")),
    responses(
        (status = 200, description = "Access point found", body = AccessPoint),
        (status = 404, description = "Access point not found")
    )
)]
pub async fn get_access_point(
    State(state): State<AccessPointsState>,
    Path(id): Path<String>,
) -> Result<Json<AccessPoint>, PlatformError> {
    let id = parse_numeric_id("Access point", &id)?;
    Ok(Json(state.access_points.get(id).await?))
}

/// Create access point
#[utoipa::path(
    post,
    path = "/",
    tag = "access-points",
    operation_id = "postUsersAccessPoints",
    request_body = AccessPointPayload,
    responses(
        (status = 201, description = "Access point created", body = AccessPoint),
        (status = 400, description = "Missing name or endpoint")
    )
)]
pub async fn create_access_point(
    State(state): State<AccessPointsState>,
    Json(payload): Json<AccessPointPayload>,
) -> Result<(StatusCode, Json<AccessPoint>), PlatformError> {
    let change = state.access_points.create(payload).await?;
    let access_point = change
        .after
        .ok_or_else(|| PlatformError::internal("Create produced no record"))?;
    Ok((StatusCode::CREATED, Json(access_point)))
}

/// Update access point
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "access-points",
    operation_id = "putUsersAccessPointsById",
    params(("id" = i64, Path, description = "Access point id")),
    request_body = AccessPointPayload,
    responses(
        (status = 200, description = "Access point updated", body = AccessPoint),
        (status = 400, description = "Malformed id or missing field"),
        (status = 404, description = "Access point not found")
    )
)]
pub async fn update_access_point(
    State(state): State<AccessPointsState>,
    Path(id): Path<String>,
    Json(payload): Json<AccessPointPayload>,
) -> Result<Json<AccessPoint>, PlatformError> {
    let id = parse_numeric_id("Access point", &id)?;
    let change = state.access_points.update(id, payload).await?;
    let access_point = change
        .after
        .ok_or_else(|| PlatformError::internal("Update produced no record"))?;
    Ok(Json(access_point))
}

/// Delete access point
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "access-points",
    operation_id = "deleteUsersAccessPointsById",
    params(("id" = i64, Path, description = "Access point id")),
    responses(
        (status = 200, description = "Access point deleted", body = SuccessResponse),
        (status = 404, description = "Access point not found")
    )
)]
pub async fn delete_access_point(
    State(state): State<AccessPointsState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    let id = parse_numeric_id("Access point", &id)?;
    state.access_points.delete(id).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub fn access_points_router(state: AccessPointsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_access_points, create_access_point))
        .routes(routes!(get_access_point, update_access_point, delete_access_point))
        .with_state(state)
}
