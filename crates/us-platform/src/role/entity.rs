//! Role entity

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::usecase::UseCaseError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Role {
    /// Store-assigned identifier
    pub id: i64,
    pub name: String,
}

/// Body of role create and update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RolePayload {
    #[serde(default)]
    pub name: String,
}

impl RolePayload {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<(), UseCaseError> {
        if self.name.trim().is_empty() {
            return Err(UseCaseError::bad_input("ROLE_NAME_REQUIRED", "name is required"));
        }
        Ok(())
    }
}
