//! Role access grant entity

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::usecase::UseCaseError;

/// Grants a role access to an access point. The pair is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleAccess {
    pub role_id: i64,
    pub ap_id: i64,
}

impl RoleAccess {
    pub fn new(role_id: i64, ap_id: i64) -> Self {
        Self { role_id, ap_id }
    }

    /// Both ids are required; zero counts as missing.
    pub fn validate(&self) -> Result<(), UseCaseError> {
        if self.role_id == 0 {
            return Err(UseCaseError::bad_input("ROLE_ID_REQUIRED", "roleId is required"));
        }
        if self.ap_id == 0 {
            return Err(UseCaseError::bad_input("AP_ID_REQUIRED", "apId is required"));
        }
        Ok(())
    }
}

/// Request body; missing ids deserialize as zero and fail validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleAccessPayload {
    #[serde(default)]
    pub role_id: i64,
    #[serde(default)]
    pub ap_id: i64,
}

impl From<RoleAccessPayload> for RoleAccess {
    fn from(p: RoleAccessPayload) -> Self {
        Self::new(p.role_id, p.ap_id)
    }
}
