//! Relational store access.
//!
//! Every repository works against an [`AnyPool`] so the same SQL runs on
//! MySQL in production and SQLite in tests. Only `?` placeholders and
//! BIGINT/TEXT columns are used.

pub mod schema;

use std::time::Duration;

use sqlx::any::{AnyPoolOptions, AnyQueryResult, install_default_drivers};
use sqlx::{Any, AnyConnection, AnyPool, Transaction};
use tracing::{info, warn};

use crate::shared::error::{PlatformError, Result};

pub use schema::{bootstrap_schema, DatabaseBackend};

/// Open a connection pool for `url`.
///
/// In-memory SQLite databases live only as long as their connection, so for
/// those the pool keeps its connections open indefinitely.
pub async fn connect(url: &str, max_connections: u32) -> Result<AnyPool> {
    install_default_drivers();
    let backend = DatabaseBackend::from_url(url)?;

    let mut options = AnyPoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(10));
    if backend == DatabaseBackend::Sqlite && url.contains(":memory:") {
        options = options.idle_timeout(None::<Duration>).max_lifetime(None::<Duration>);
    }

    let pool = options.connect(url).await?;
    info!(backend = ?backend, max_connections, "Connected to database");
    Ok(pool)
}

/// Roll back `tx`, logging rather than surfacing a failed rollback so the
/// original error reaches the caller.
pub async fn rollback(tx: Transaction<'_, Any>) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "Transaction rollback failed");
    }
}

/// Id assigned to the row just inserted on `conn`.
///
/// MySQL reports it with the query result. The SQLite driver does not, so the
/// row id is read back on the same connection, which keeps it correct inside
/// a transaction.
pub async fn inserted_id(conn: &mut AnyConnection, result: &AnyQueryResult) -> Result<i64> {
    if let Some(id) = result.last_insert_id() {
        return Ok(id);
    }
    let id: i64 = sqlx::query_scalar("SELECT last_insert_rowid()")
        .fetch_one(conn)
        .await?;
    Ok(id)
}

impl From<schema::UnsupportedBackend> for PlatformError {
    fn from(err: schema::UnsupportedBackend) -> Self {
        PlatformError::internal(err.to_string())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::AnyPool;

    /// A fresh single-connection in-memory database with all tables created.
    pub async fn memory_pool() -> AnyPool {
        let pool = super::connect("sqlite::memory:", 1).await.unwrap();
        super::bootstrap_schema(&pool, super::DatabaseBackend::Sqlite).await.unwrap();
        pool
    }
}
