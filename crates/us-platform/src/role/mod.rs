//! Role aggregate

pub mod api;
pub mod entity;
pub mod repository;
pub mod service;

pub use entity::{Role, RolePayload};
pub use repository::RoleRepository;
pub use service::RoleService;
