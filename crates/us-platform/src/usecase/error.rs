//! Use Case Errors
//!
//! Categorized failures returned by the account, role, access point and
//! role-access services. Each category maps to one HTTP status at the
//! boundary.
//!
//! ```ignore
//! use us_platform::usecase::{UseCaseError, details};
//!
//! UseCaseError::bad_input("USER_ID_REQUIRED", "User ID cannot be empty");
//!
//! UseCaseError::validation_with_details(
//!     "EMAIL_INVALID",
//!     "Email address is malformed",
//!     details!{ "email" => email },
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Macro for creating error detail maps.
#[macro_export]
macro_rules! details {
    () => {
        std::collections::HashMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = std::collections::HashMap::new();
        $(
            map.insert($key.to_string(), serde_json::json!($value));
        )+
        map
    }};
}

/// Categorized error types for use case failures.
///
/// - `BadInput` -> 400 Bad Request
/// - `ValidationError` -> 400 Bad Request
/// - `NotFoundError` -> 404 Not Found
/// - `StorageError` -> 500 Internal Server Error
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UseCaseError {
    /// Empty or missing identifier, missing required field, malformed payload.
    BadInput {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// A field violates its format constraint (e.g. malformed email).
    ValidationError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// Referenced record does not exist.
    NotFoundError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// The store failed to read, write, begin or commit.
    StorageError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },
}

impl UseCaseError {
    pub fn bad_input(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadInput {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn validation_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFoundError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn not_found_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::NotFoundError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    /// Storage failure; `context` names the step that failed.
    pub fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        Self::StorageError {
            code: "STORAGE_FAILED".to_string(),
            message: format!("{}: {}", context, err),
            details: HashMap::new(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::BadInput { code, .. } => code,
            Self::ValidationError { code, .. } => code,
            Self::NotFoundError { code, .. } => code,
            Self::StorageError { code, .. } => code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadInput { message, .. } => message,
            Self::ValidationError { message, .. } => message,
            Self::NotFoundError { message, .. } => message,
            Self::StorageError { message, .. } => message,
        }
    }

    /// True for every failure the caller caused (bad identifiers, missing
    /// fields and field-format violations alike).
    pub fn is_bad_input(&self) -> bool {
        matches!(self, Self::BadInput { .. } | Self::ValidationError { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFoundError { .. })
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageError { .. })
    }

    /// Get the suggested HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::BadInput { .. } => 400,
            Self::ValidationError { .. } => 400,
            Self::NotFoundError { .. } => 404,
            Self::StorageError { .. } => 500,
        }
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for UseCaseError {}
