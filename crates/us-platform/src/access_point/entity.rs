//! Access point entity

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::usecase::UseCaseError;

/// A named protected endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccessPoint {
    pub id: i64,
    pub name: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccessPointPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub endpoint: String,
}

impl AccessPointPayload {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn validate(&self) -> Result<(), UseCaseError> {
        if self.name.trim().is_empty() {
            return Err(UseCaseError::bad_input("ACCESS_POINT_NAME_REQUIRED", "name is required"));
        }
        if self.endpoint.trim().is_empty() {
            return Err(UseCaseError::bad_input(
                "ACCESS_POINT_ENDPOINT_REQUIRED",
                "endpoint is required",
            ));
        }
        Ok(())
    }
}
