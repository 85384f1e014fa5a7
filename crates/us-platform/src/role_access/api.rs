//! Role Access API

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::role_access::entity::{RoleAccess, RoleAccessPayload};
use crate::role_access::service::RoleAccessService;
use crate::shared::api_common::SuccessResponse;
use crate::shared::error::PlatformError;

#[derive(Clone)]
pub struct RoleAccessState {
    pub role_access: Arc<RoleAccessService>,
}

/// List role access grants
#[utoipa::path(
    get,
    path = "/",
    tag = "role-access",
    operation_id = "getUsersRoleAccess",
    responses(
        (status = 200, description = "All grants", body = Vec<RoleAccess>)
    )
)]
pub async fn list_role_access(
    State(state): State<RoleAccessState>,
) -> Result<Json<Vec<RoleAccess>>, PlatformError> {
    Ok(Json(state.role_access.list().await?))
}

/// Grant a role access to an access point
#[utoipa::path(
    post,
    path = "/",
    tag = "role-access",
    operation_id = "postUsersRoleAccess",
    request_body = RoleAccessPayload,
    responses(
        (status = 201, description = "Grant created", body = RoleAccess),
        (status = 400, description = "Missing id or grant already exists")
    )
)]
pub async fn create_role_access(
    State(state): State<RoleAccessState>,
    Json(payload): Json<RoleAccessPayload>,
) -> Result<(StatusCode, Json<RoleAccess>), PlatformError> {
    let change = state.role_access.create(payload.into()).await?;
    let grant = change
        .after
        .ok_or_else(|| PlatformError::internal("Create produced no record"))?;
    Ok((StatusCode::CREATED, Json(grant)))
}

/// Revoke a grant identified by the pair in the request body
#[utoipa::path(
    delete,
    path = "/",
    tag = "role-access",
    operation_id = "deleteUsersRoleAccess",
    request_body = RoleAccessPayload,
    responses(
        (status = 200, description = "Grant deleted", body = SuccessResponse),
        (status = 400, description = "Missing id"),
        (status = 404, description = "Grant not found")
    )
)]
pub async fn delete_role_access(
    State(state): State<RoleAccessState>,
    Json(payload): Json<RoleAccessPayload>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    state.role_access.delete(payload.into()).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub fn role_access_router(state: RoleAccessState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_role_access, create_role_access, delete_role_access))
        .with_state(state)
}
