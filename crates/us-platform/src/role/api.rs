//! Roles API

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::audit::{EntityChange, EntityType};
use crate::auth::{actor_required, Actor, ActorIdentityExtractor};
use crate::role::entity::{Role, RolePayload};
use crate::role::service::RoleService;
use crate::shared::api_common::{parse_numeric_id, SuccessResponse};
use crate::shared::error::PlatformError;

#[derive(Clone)]
pub struct RolesState {
    pub roles: Arc<RoleService>,
}

/// List roles
#[utoipa::path(
    get,
    path = "/",
    tag = "roles",
    operation_id = "getUsersRoles",
    responses(
        (status = 200, description = "All roles", body = Vec<Role>)
    )
)]
pub async fn list_roles(State(state): State<RolesState>) -> Result<Json<Vec<Role>>, PlatformError> {
    Ok(Json(state.roles.list().await?))
}

/// Get role by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "roles",
    operation_id = "getUsersRolesById",
    params(("id" = i64, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role found", body = Role),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Role not found")
    )
)]
pub async fn get_role(
    State(state): State<RolesState>,
    Path(id): Path<String>,
) -> Result<Json<Role>, PlatformError> {
    let id = parse_numeric_id("Role", &id)?;
    Ok(Json(state.roles.get(id).await?))
}

/// Create role
#[utoipa::path(
    post,
    path = "/",
    tag = "roles",
    operation_id = "postUsersRoles",
    request_body = RolePayload,
    responses(
        (status = 201, description = "Role created", body = Role),
        (status = 400, description = "Missing name"),
        (status = 403, description = "Missing or invalid identity token")
    ),
    security(("id_token" = []))
)]
pub async fn create_role(
    State(state): State<RolesState>,
    actor: Actor,
    Json(payload): Json<RolePayload>,
) -> Result<(StatusCode, Extension<EntityChange>, Json<Role>), PlatformError> {
    let change = state.roles.create(payload.clone()).await?;
    let role = change
        .after
        .clone()
        .ok_or_else(|| PlatformError::internal("Create produced no record"))?;

    tracing::info!(role_id = role.id, actor = %actor.user_id, "Role created via API");
    let audit = EntityChange::new(EntityType::Role, role.id.to_string(), &change).with_payload(&payload);
    Ok((StatusCode::CREATED, Extension(audit), Json(role)))
}

/// Update role
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "roles",
    operation_id = "putUsersRolesById",
    params(("id" = i64, Path, description = "Role id")),
    request_body = RolePayload,
    responses(
        (status = 200, description = "Role updated", body = Role),
        (status = 400, description = "Malformed id or missing name"),
        (status = 403, description = "Missing or invalid identity token"),
        (status = 404, description = "Role not found")
    ),
    security(("id_token" = []))
)]
pub async fn update_role(
    State(state): State<RolesState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(payload): Json<RolePayload>,
) -> Result<(Extension<EntityChange>, Json<Role>), PlatformError> {
    let id = parse_numeric_id("Role", &id)?;
    let change = state.roles.update(id, payload.clone()).await?;
    let role = change
        .after
        .clone()
        .ok_or_else(|| PlatformError::internal("Update produced no record"))?;

    tracing::info!(role_id = id, actor = %actor.user_id, "Role updated via API");
    let audit = EntityChange::new(EntityType::Role, id.to_string(), &change).with_payload(&payload);
    Ok((Extension(audit), Json(role)))
}

/// Delete role
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "roles",
    operation_id = "deleteUsersRolesById",
    params(("id" = i64, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role deleted", body = SuccessResponse),
        (status = 400, description = "Malformed id"),
        (status = 403, description = "Missing or invalid identity token"),
        (status = 404, description = "Role not found")
    ),
    security(("id_token" = []))
)]
pub async fn delete_role(
    State(state): State<RolesState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<(Extension<EntityChange>, Json<SuccessResponse>), PlatformError> {
    let id = parse_numeric_id("Role", &id)?;
    let change = state.roles.delete(id).await?;

    tracing::info!(role_id = id, actor = %actor.user_id, "Role deleted via API");
    let audit = EntityChange::new(EntityType::Role, id.to_string(), &change);
    Ok((Extension(audit), Json(SuccessResponse::ok())))
}

pub fn roles_router(state: RolesState, identity: Arc<ActorIdentityExtractor>) -> OpenApiRouter {
    let (create_schemas, create_paths, create) = routes!(create_role);
    let (write_schemas, write_paths, writes) = routes!(update_role, delete_role);

    OpenApiRouter::new()
        .routes(routes!(list_roles))
        .routes(routes!(get_role))
        .routes((create_schemas, create_paths, actor_required(create, &identity)))
        .routes((write_schemas, write_paths, actor_required(writes, &identity)))
        .with_state(state)
}
