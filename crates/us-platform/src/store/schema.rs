//! Table definitions for the supported backends.

use sqlx::AnyPool;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    MySql,
    Sqlite,
}

#[derive(Debug, Error)]
#[error("Unsupported database URL scheme: {0}")]
pub struct UnsupportedBackend(pub String);

impl DatabaseBackend {
    pub fn from_url(url: &str) -> Result<Self, UnsupportedBackend> {
        let scheme = url.split(':').next().unwrap_or_default().to_ascii_lowercase();
        match scheme.as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(UnsupportedBackend(scheme)),
        }
    }

    fn statements(self) -> &'static [&'static str] {
        match self {
            Self::MySql => MYSQL_SCHEMA,
            Self::Sqlite => SQLITE_SCHEMA,
        }
    }
}

const MYSQL_SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id VARCHAR(64) NOT NULL PRIMARY KEY,
        first_name VARCHAR(255) NOT NULL,
        last_name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL,
        role BIGINT NULL
    )",
    "CREATE TABLE IF NOT EXISTS roles (
        id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(255) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS access_points (
        id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        endpoint VARCHAR(1024) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS role_access (
        role_id BIGINT NOT NULL,
        ap_id BIGINT NOT NULL,
        PRIMARY KEY (role_id, ap_id)
    )",
];

const SQLITE_SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT NOT NULL PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL,
        role INTEGER NULL
    )",
    "CREATE TABLE IF NOT EXISTS roles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS access_points (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        endpoint TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS role_access (
        role_id INTEGER NOT NULL,
        ap_id INTEGER NOT NULL,
        PRIMARY KEY (role_id, ap_id)
    )",
];

/// Create any missing tables. Existing tables are left untouched.
pub async fn bootstrap_schema(pool: &AnyPool, backend: DatabaseBackend) -> Result<(), sqlx::Error> {
    for statement in backend.statements() {
        sqlx::query(statement).execute(pool).await?;
    }
    info!(backend = ?backend, tables = backend.statements().len(), "Schema bootstrapped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_url() {
        assert_eq!(DatabaseBackend::from_url("mysql://root@localhost/db").unwrap(), DatabaseBackend::MySql);
        assert_eq!(DatabaseBackend::from_url("sqlite::memory:").unwrap(), DatabaseBackend::Sqlite);
        assert!(DatabaseBackend::from_url("postgres://localhost/db").is_err());
    }

    #[tokio::test]
    async fn test_bootstrap_is_repeatable() {
        let pool = crate::store::connect("sqlite::memory:", 1).await.unwrap();
        bootstrap_schema(&pool, DatabaseBackend::Sqlite).await.unwrap();
        bootstrap_schema(&pool, DatabaseBackend::Sqlite).await.unwrap();

        let result = sqlx::query("SELECT COUNT(*) FROM users").execute(&pool).await;
        assert!(result.is_ok());
    }
}
