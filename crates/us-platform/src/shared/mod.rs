//! Shared infrastructure

pub mod api_common;
pub mod error;
pub mod health_api;
