//! Role access aggregate

pub mod api;
pub mod entity;
pub mod repository;
pub mod service;

pub use entity::{RoleAccess, RoleAccessPayload};
pub use repository::RoleAccessRepository;
pub use service::RoleAccessService;
