//! Common API types and utilities

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::error::PlatformError;

/// Query-string numbers arrive as strings; an empty value means "not supplied".
pub(crate) mod string_or_number {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNum {
        Num(i64),
        Str(String),
    }

    fn parse<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<StringOrNum>::deserialize(deserializer)? {
            Some(StringOrNum::Num(n)) => Ok(Some(n)),
            Some(StringOrNum::Str(s)) if s.trim().is_empty() => Ok(None),
            Some(StringOrNum::Str(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }

    pub fn deserialize_i64_opt<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse(deserializer)
    }
}

/// Pagination parameters. Both values are required and must be positive.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// 1-based page number
    #[serde(default, deserialize_with = "string_or_number::deserialize_i64_opt")]
    pub page: Option<i64>,
    /// Records per page
    #[serde(default, alias = "pageSize", deserialize_with = "string_or_number::deserialize_i64_opt")]
    pub size: Option<i64>,
}

impl PaginationParams {
    /// Returns `(page, size)` once both are present, positive, and the size
    /// does not exceed `max_size`.
    pub fn validate(&self, max_size: u32) -> Result<(u32, u32), PlatformError> {
        let page = positive("page", self.page)?;
        let size = positive("size", self.size)?;
        if size > max_size {
            return Err(PlatformError::bad_request(format!(
                "size must not exceed {}",
                max_size
            )));
        }
        Ok((page, size))
    }
}

fn positive(name: &str, value: Option<i64>) -> Result<u32, PlatformError> {
    match value {
        None => Err(PlatformError::bad_request(format!("{} is required", name))),
        Some(v) if v <= 0 => Err(PlatformError::bad_request(format!(
            "{} must be a positive integer",
            name
        ))),
        Some(v) => u32::try_from(v)
            .map_err(|_| PlatformError::bad_request(format!("{} is too large", name))),
    }
}

/// Parse a numeric path identifier, rejecting blanks and non-numbers.
pub fn parse_numeric_id(entity_type: &str, raw: &str) -> Result<i64, PlatformError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PlatformError::bad_request(format!(
            "{} ID cannot be empty",
            entity_type
        )));
    }
    raw.parse().map_err(|_| {
        PlatformError::bad_request(format!("Invalid {} ID: {}", entity_type, raw))
    })
}

/// Body returned by successful deletes.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct SuccessResponse(pub String);

impl SuccessResponse {
    pub fn ok() -> Self {
        Self("Success".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_requires_both_values() {
        let params = PaginationParams { page: Some(1), size: None };
        assert!(params.validate(100).is_err());
        let params = PaginationParams { page: None, size: Some(10) };
        assert!(params.validate(100).is_err());
    }

    #[test]
    fn test_pagination_rejects_non_positive() {
        let params = PaginationParams { page: Some(0), size: Some(10) };
        assert!(params.validate(100).is_err());
        let params = PaginationParams { page: Some(2), size: Some(-5) };
        assert!(params.validate(100).is_err());
    }

    #[test]
    fn test_pagination_caps_size() {
        let params = PaginationParams { page: Some(1), size: Some(101) };
        assert!(params.validate(100).is_err());
        let params = PaginationParams { page: Some(2), size: Some(100) };
        assert_eq!(params.validate(100).unwrap(), (2, 100));
    }

    #[test]
    fn test_pagination_accepts_string_numbers() {
        let params: PaginationParams =
            serde_json::from_value(serde_json::json!({ "page": "3", "size": "25" })).unwrap();
        assert_eq!(params.validate(100).unwrap(), (3, 25));
    }

    #[test]
    fn test_parse_numeric_id() {
        assert_eq!(parse_numeric_id("Role", " 12 ").unwrap(), 12);
        assert!(parse_numeric_id("Role", "").is_err());
        assert!(parse_numeric_id("Role", "abc").is_err());
    }
}
