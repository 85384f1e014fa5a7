//! Accounts API
//!
//! Reads are open; mutations and the role-set lookup require an identity
//! token. Mutation responses carry an [`EntityChange`] for the audit layer.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::audit::{EntityChange, EntityType};
use crate::auth::{actor_required, Actor, ActorIdentityExtractor};
use crate::shared::api_common::{string_or_number, PaginationParams, SuccessResponse};
use crate::shared::error::PlatformError;
use crate::user::entity::{User, UserPayload};
use crate::user::filter::UserCriteria;
use crate::user::mutation::AccountMutationService;
use crate::user::query::AccountQueryService;

/// Query parameters for listing accounts
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Id prefix
    pub id: Option<String>,
    /// Role id; absent or 0 selects accounts without a role, -1 any role
    #[serde(default, deserialize_with = "string_or_number::deserialize_i64_opt")]
    pub role: Option<i64>,
    /// First- or last-name prefix
    pub name: Option<String>,
    /// Email prefix
    pub email: Option<String>,
}

impl From<ListUsersQuery> for UserCriteria {
    fn from(q: ListUsersQuery) -> Self {
        Self {
            id: q.id,
            role: q.role,
            name: q.name,
            email: q.email,
        }
    }
}

/// Role-set lookup request
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UsersWithRolesRequest {
    pub roles: Option<Vec<i64>>,
}

#[derive(Clone)]
pub struct UsersState {
    pub queries: Arc<AccountQueryService>,
    pub mutations: Arc<AccountMutationService>,
    pub max_page_size: u32,
}

/// List accounts
#[utoipa::path(
    get,
    path = "/",
    tag = "accounts",
    operation_id = "getUsersAccounts",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Matching accounts", body = Vec<User>),
        (status = 400, description = "Malformed query")
    )
)]
pub async fn list_users(
    State(state): State<UsersState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<User>>, PlatformError> {
    let users = state.queries.list(&query.into()).await?;
    Ok(Json(users))
}

/// Page through all accounts
#[utoipa::path(
    get,
    path = "/paginate",
    tag = "accounts",
    operation_id = "getUsersAccountsPaginate",
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of accounts", body = Vec<User>),
        (status = 400, description = "Missing, non-positive or oversized page parameters")
    )
)]
pub async fn paginate_users(
    State(state): State<UsersState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<User>>, PlatformError> {
    let (page, size) = params.validate(state.max_page_size)?;
    let users = state.queries.paginate(page, size).await?;
    Ok(Json(users))
}

/// Get account by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "accounts",
    operation_id = "getUsersAccountsById",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account found", body = User),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_user(
    State(state): State<UsersState>,
    Path(id): Path<String>,
) -> Result<Json<User>, PlatformError> {
    let user = state.queries.get_by_id(&id).await?;
    Ok(Json(user))
}

/// Create account
#[utoipa::path(
    post,
    path = "/",
    tag = "accounts",
    operation_id = "postUsersAccounts",
    request_body = UserPayload,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Missing field or malformed email"),
        (status = 403, description = "Missing or invalid identity token")
    ),
    security(("id_token" = []))
)]
pub async fn create_user(
    State(state): State<UsersState>,
    actor: Actor,
    Json(payload): Json<UserPayload>,
) -> Result<(StatusCode, Extension<EntityChange>, Json<User>), PlatformError> {
    let change = state.mutations.create(payload.clone()).await?;
    let user = change
        .after
        .clone()
        .ok_or_else(|| PlatformError::internal("Create produced no record"))?;

    tracing::info!(user_id = %user.id, actor = %actor.user_id, "Account created via API");
    let audit = EntityChange::new(EntityType::User, &user.id, &change).with_payload(&payload);
    Ok((StatusCode::CREATED, Extension(audit), Json(user)))
}

/// List accounts holding any of the given roles
#[utoipa::path(
    post,
    path = "/with-roles",
    tag = "accounts",
    operation_id = "postUsersAccountsWithRoles",
    request_body = UsersWithRolesRequest,
    responses(
        (status = 200, description = "Accounts whose role is in the set", body = Vec<User>),
        (status = 400, description = "Missing roles list"),
        (status = 403, description = "Missing or invalid identity token")
    ),
    security(("id_token" = []))
)]
pub async fn list_users_with_roles(
    State(state): State<UsersState>,
    Json(req): Json<UsersWithRolesRequest>,
) -> Result<Json<Vec<User>>, PlatformError> {
    let roles = req
        .roles
        .ok_or_else(|| PlatformError::bad_request("roles is required"))?;
    let users = state.queries.list_by_roles(&roles).await?;
    Ok(Json(users))
}

/// Update account
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "accounts",
    operation_id = "putUsersAccountsById",
    params(("id" = String, Path, description = "Account id")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "Account updated", body = User),
        (status = 400, description = "Missing field or malformed email"),
        (status = 403, description = "Missing or invalid identity token"),
        (status = 404, description = "Account not found")
    ),
    security(("id_token" = []))
)]
pub async fn update_user(
    State(state): State<UsersState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(payload): Json<UserPayload>,
) -> Result<(Extension<EntityChange>, Json<User>), PlatformError> {
    let change = state.mutations.update(&id, payload.clone()).await?;
    let user = change
        .after
        .clone()
        .ok_or_else(|| PlatformError::internal("Update produced no record"))?;

    tracing::info!(user_id = %user.id, actor = %actor.user_id, "Account updated via API");
    let audit = EntityChange::new(EntityType::User, &user.id, &change).with_payload(&payload);
    Ok((Extension(audit), Json(user)))
}

/// Delete account
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "accounts",
    operation_id = "deleteUsersAccountsById",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account deleted", body = SuccessResponse),
        (status = 403, description = "Missing or invalid identity token"),
        (status = 404, description = "Account not found")
    ),
    security(("id_token" = []))
)]
pub async fn delete_user(
    State(state): State<UsersState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<(Extension<EntityChange>, Json<SuccessResponse>), PlatformError> {
    let change = state.mutations.delete(&id).await?;

    tracing::info!(user_id = %id.trim(), actor = %actor.user_id, "Account deleted via API");
    let audit = EntityChange::new(EntityType::User, id.trim(), &change);
    Ok((Extension(audit), Json(SuccessResponse::ok())))
}

pub fn users_router(state: UsersState, identity: Arc<ActorIdentityExtractor>) -> OpenApiRouter {
    let (create_schemas, create_paths, create) = routes!(create_user);
    let (roles_schemas, roles_paths, with_roles) = routes!(list_users_with_roles);
    let (write_schemas, write_paths, writes) = routes!(update_user, delete_user);

    OpenApiRouter::new()
        .routes(routes!(list_users))
        .routes(routes!(paginate_users))
        .routes(routes!(get_user))
        .routes((create_schemas, create_paths, actor_required(create, &identity)))
        .routes((roles_schemas, roles_paths, actor_required(with_roles, &identity)))
        .routes((write_schemas, write_paths, actor_required(writes, &identity)))
        .with_state(state)
}
