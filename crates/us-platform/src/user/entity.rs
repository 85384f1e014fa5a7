//! User account entity

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::details;
use crate::usecase::UseCaseError;

fn email_pattern() -> &'static Regex {
    static PATTERN: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
    })
}

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned UUID, immutable after creation
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Optional role reference; `null` means no role assigned
    pub role: Option<i64>,
}

impl User {
    /// Build a new account from a validated payload with a fresh identifier.
    /// Any identifier the caller supplied is ignored.
    pub fn new(payload: UserPayload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            role: payload.role,
        }
    }

    /// Merge an update into this record. The identifier never changes and an
    /// absent role keeps the stored one.
    pub fn merged(&self, payload: UserPayload) -> Self {
        Self {
            id: self.id.clone(),
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            role: payload.role.or(self.role),
        }
    }
}

/// Body of create and update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<i64>,
}

impl UserPayload {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: i64) -> Self {
        self.role = Some(role);
        self
    }

    /// Required fields must be non-blank and the email well formed.
    pub fn validate(&self) -> Result<(), UseCaseError> {
        for (field, value) in [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
        ] {
            if value.trim().is_empty() {
                return Err(UseCaseError::bad_input(
                    "FIELD_REQUIRED",
                    format!("{} is required", field),
                ));
            }
        }

        if !email_pattern().is_match(self.email.trim()) {
            return Err(UseCaseError::validation_with_details(
                "EMAIL_INVALID",
                format!("Email '{}' is not a valid address", self.email),
                details! { "field" => "email" },
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_gets_fresh_id() {
        let a = User::new(UserPayload::new("Ada", "Lovelace", "ada@example.com"));
        let b = User::new(UserPayload::new("Ada", "Lovelace", "ada@example.com"));
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_payload_ignores_client_id() {
        let payload: UserPayload = serde_json::from_value(serde_json::json!({
            "id": "client-chosen",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com"
        }))
        .unwrap();
        assert_ne!(User::new(payload).id, "client-chosen");
    }

    #[test]
    fn test_merged_keeps_id_and_role_when_absent() {
        let user = User::new(UserPayload::new("Ada", "Lovelace", "ada@example.com").with_role(3));
        let merged = user.merged(UserPayload::new("Ada", "King", "ada@king.org"));
        assert_eq!(merged.id, user.id);
        assert_eq!(merged.last_name, "King");
        assert_eq!(merged.role, Some(3));

        let reassigned = user.merged(UserPayload::new("Ada", "King", "ada@king.org").with_role(5));
        assert_eq!(reassigned.role, Some(5));
    }

    #[test]
    fn test_validate_requires_fields() {
        let err = UserPayload::new("", "B", "a@b.co").validate().unwrap_err();
        assert!(matches!(err, UseCaseError::BadInput { .. }));
        let err = UserPayload::new("A", "  ", "a@b.co").validate().unwrap_err();
        assert!(matches!(err, UseCaseError::BadInput { .. }));
        let err = UserPayload::new("A", "B", "").validate().unwrap_err();
        assert!(matches!(err, UseCaseError::BadInput { .. }));
    }

    #[test]
    fn test_validate_email_format() {
        assert!(UserPayload::new("A", "B", "a@b.co").validate().is_ok());
        assert!(UserPayload::new("A", "B", "first.last+tag@sub.example.org").validate().is_ok());

        let err = UserPayload::new("A", "B", "bad-email").validate().unwrap_err();
        assert!(matches!(err, UseCaseError::ValidationError { .. }));
        assert!(err.is_bad_input());
        assert!(UserPayload::new("A", "B", "a@b").validate().is_err());
        assert!(UserPayload::new("A", "B", "a b@c.com").validate().is_err());
    }

    #[test]
    fn test_serializes_camel_case_with_null_role() {
        let user = User {
            id: "u1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            role: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert!(json["role"].is_null());
    }
}
