//! Access point aggregate

pub mod api;
pub mod entity;
pub mod repository;
pub mod service;

pub use entity::{AccessPoint, AccessPointPayload};
pub use repository::AccessPointRepository;
pub use service::AccessPointService;
