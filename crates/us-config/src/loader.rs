//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "user-storage.toml",
    "./config/config.toml",
    "/etc/user-storage/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with a custom variable lookup.
    pub fn load_with<F>(&self, lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file(&lookup) {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, &lookup);
        config.validate()?;

        Ok(config)
    }

    fn find_config_file<F>(&self, lookup: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Some(path) = lookup("USER_STORAGE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn split_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn apply_overrides<F>(config: &mut AppConfig, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(port) = lookup("USER_STORAGE_HTTP_PORT").and_then(|v| v.parse().ok()) {
        config.http.port = port;
    }
    if let Some(val) = lookup("USER_STORAGE_HTTP_HOST") {
        config.http.host = val;
    }
    if let Some(val) = lookup("USER_STORAGE_CORS_ORIGINS") {
        config.http.cors_origins = split_list(&val);
    }
    if let Some(size) = lookup("USER_STORAGE_MAX_PAGE_SIZE").and_then(|v| v.parse().ok()) {
        config.http.max_page_size = size;
    }

    // Database
    if let Some(val) = lookup("USER_STORAGE_DATABASE_URL") {
        config.database.url = val;
    }
    if let Some(max) = lookup("USER_STORAGE_DATABASE_MAX_CONNECTIONS").and_then(|v| v.parse().ok()) {
        config.database.max_connections = max;
    }
    if let Some(flag) = lookup("USER_STORAGE_DATABASE_BOOTSTRAP").and_then(|v| parse_bool(&v)) {
        config.database.bootstrap_schema = flag;
    }

    // Redis
    if let Some(flag) = lookup("USER_STORAGE_REDIS_ENABLED").and_then(|v| parse_bool(&v)) {
        config.redis.enabled = flag;
    }
    if let Some(val) = lookup("USER_STORAGE_REDIS_NODES") {
        config.redis.nodes = split_list(&val);
    }

    // Auth; JWT_SECRET is the variable older deployments export the key set under
    if let Some(val) = lookup("USER_STORAGE_JWKS").or_else(|| lookup("JWT_SECRET")) {
        config.auth.jwks = val;
    }
    if let Some(val) = lookup("USER_STORAGE_JWT_AUDIENCE") {
        config.auth.audience = Some(val).filter(|v| !v.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let loader = ConfigLoader::with_path("/nonexistent/user-storage.toml");
        let config = loader
            .load_with(lookup_from(&[
                ("USER_STORAGE_HTTP_PORT", "9090"),
                ("USER_STORAGE_DATABASE_URL", "sqlite::memory:"),
                ("USER_STORAGE_REDIS_NODES", "redis://a:6379, redis://b:6379"),
                ("USER_STORAGE_REDIS_ENABLED", "yes"),
                ("USER_STORAGE_JWT_AUDIENCE", "directory"),
            ]))
            .unwrap();

        assert_eq!(config.http.port, 9090);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.redis.nodes.len(), 2);
        assert_eq!(config.auth.audience.as_deref(), Some("directory"));
    }

    #[test]
    fn test_legacy_jwt_secret_variable() {
        let loader = ConfigLoader::with_path("/nonexistent/user-storage.toml");
        let config = loader
            .load_with(lookup_from(&[("JWT_SECRET", "{\"keys\":[]}")]))
            .unwrap();
        assert_eq!(config.auth.jwks, "{\"keys\":[]}");

        let config = loader
            .load_with(lookup_from(&[
                ("JWT_SECRET", "legacy"),
                ("USER_STORAGE_JWKS", "preferred"),
            ]))
            .unwrap();
        assert_eq!(config.auth.jwks, "preferred");
    }

    #[test]
    fn test_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = 7000\nhost = \"127.0.0.1\"").unwrap();

        let loader = ConfigLoader::with_path(file.path());
        let config = loader
            .load_with(lookup_from(&[("USER_STORAGE_HTTP_PORT", "7001")]))
            .unwrap();

        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 7001);
    }

    #[test]
    fn test_invalid_override_is_rejected_by_validation() {
        let loader = ConfigLoader::with_path("/nonexistent/user-storage.toml");
        let result = loader.load_with(lookup_from(&[("USER_STORAGE_MAX_PAGE_SIZE", "0")]));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
