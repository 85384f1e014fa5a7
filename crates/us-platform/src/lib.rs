//! User Storage Platform
//!
//! Directory service core:
//! - Account queries with composable filters and pagination
//! - Transactional account mutations with cache eviction
//! - Role, access point and role-access management
//! - Identity-token verification for mutating routes
//! - Actor-attributed audit events for account and role mutations
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities and request payloads
//! - `repository` - Data access
//! - `service` (or `query`/`mutation`) - Use cases
//! - `api` - REST endpoints

// Aggregates
pub mod access_point;
pub mod role;
pub mod role_access;
pub mod user;

// Cross-cutting concerns
pub mod audit;
pub mod auth;
pub mod cache;

// Shared infrastructure
pub mod app;
pub mod shared;
pub mod store;
pub mod usecase;

pub use shared::error::{PlatformError, Result};
pub use usecase::{Change, UseCaseError, UseCaseResult};

pub use access_point::{AccessPoint, AccessPointService};
pub use role::{Role, RoleService};
pub use role_access::{RoleAccess, RoleAccessService};
pub use user::{AccountMutationService, AccountQueryService, User, UserCriteria, UserPayload};

pub use app::{platform_router, PlatformServices, RouterSettings};
pub use audit::{AuditEvent, AuditLogger, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use auth::{ActorIdentity, ActorIdentityExtractor, ID_TOKEN_HEADER};
pub use cache::{CacheInvalidator, EvictionOutcome, MemoryCacheInvalidator, NoopCacheInvalidator, RedisCacheInvalidator};
