//! Service graph and router assembly.

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::Router;
use sqlx::AnyPool;
use utoipa::openapi::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::access_point::api::{access_points_router, AccessPointsState};
use crate::access_point::{AccessPointRepository, AccessPointService};
use crate::audit::{audit_requests, AuditLogger, AuditSink};
use crate::auth::ActorIdentityExtractor;
use crate::cache::CacheInvalidator;
use crate::role::api::{roles_router, RolesState};
use crate::role::{RoleRepository, RoleService};
use crate::role_access::api::{role_access_router, RoleAccessState};
use crate::role_access::{RoleAccessRepository, RoleAccessService};
use crate::shared::health_api::health_router;
use crate::user::api::{users_router, UsersState};
use crate::user::{AccountMutationService, AccountQueryService, UserRepository};

/// Every route lives under this prefix.
pub const BASE_PATH: &str = "/users";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterSettings {
    pub max_page_size: u32,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self { max_page_size: 100 }
    }
}

/// All services, each built from explicitly injected store and cache handles.
#[derive(Clone)]
pub struct PlatformServices {
    pub account_queries: Arc<AccountQueryService>,
    pub account_mutations: Arc<AccountMutationService>,
    pub roles: Arc<RoleService>,
    pub access_points: Arc<AccessPointService>,
    pub role_access: Arc<RoleAccessService>,
    pub identity: Arc<ActorIdentityExtractor>,
    pub audit: Arc<AuditLogger>,
}

impl PlatformServices {
    pub fn new(
        pool: AnyPool,
        cache: Arc<dyn CacheInvalidator>,
        identity: ActorIdentityExtractor,
        audit_sink: Arc<dyn AuditSink>,
    ) -> Self {
        let user_repo = Arc::new(UserRepository::new(pool.clone()));
        Self {
            account_queries: Arc::new(AccountQueryService::new(user_repo.clone())),
            account_mutations: Arc::new(AccountMutationService::new(user_repo, cache)),
            roles: Arc::new(RoleService::new(Arc::new(RoleRepository::new(pool.clone())))),
            access_points: Arc::new(AccessPointService::new(Arc::new(AccessPointRepository::new(
                pool.clone(),
            )))),
            role_access: Arc::new(RoleAccessService::new(Arc::new(RoleAccessRepository::new(pool)))),
            identity: Arc::new(identity),
            audit: Arc::new(AuditLogger::with_default_families(BASE_PATH, audit_sink)),
        }
    }
}

/// Build the API router with the audit layer applied, plus its OpenAPI
/// document.
pub fn platform_router(services: &PlatformServices, settings: RouterSettings) -> (Router, OpenApi) {
    let users_state = UsersState {
        queries: services.account_queries.clone(),
        mutations: services.account_mutations.clone(),
        max_page_size: settings.max_page_size,
    };

    let (router, mut openapi) = OpenApiRouter::new()
        .nest(&format!("{}/health", BASE_PATH), health_router())
        .nest(
            &format!("{}/accounts", BASE_PATH),
            users_router(users_state, services.identity.clone()),
        )
        .nest(
            &format!("{}/roles", BASE_PATH),
            roles_router(RolesState { roles: services.roles.clone() }, services.identity.clone()),
        )
        .nest(
            &format!("{}/access-points", BASE_PATH),
            access_points_router(AccessPointsState {
                access_points: services.access_points.clone(),
            }),
        )
        .nest(
            &format!("{}/role-access", BASE_PATH),
            role_access_router(RoleAccessState {
                role_access: services.role_access.clone(),
            }),
        )
        .split_for_parts();

    openapi.info.title = "User Storage API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description = Some("Accounts, roles, access points and role access grants".to_string());

    let router = router.layer(from_fn_with_state(services.audit.clone(), audit_requests));
    (router, openapi)
}
