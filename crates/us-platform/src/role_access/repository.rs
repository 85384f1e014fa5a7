//! Role Access Repository

use sqlx::any::AnyRow;
use sqlx::{Any, AnyConnection, AnyPool, Row, Transaction};

use crate::role_access::entity::RoleAccess;
use crate::shared::error::Result;

pub struct RoleAccessRepository {
    pool: AnyPool,
}

impl RoleAccessRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Any>> {
        Ok(self.pool.begin().await?)
    }

    pub async fn find_all(&self) -> Result<Vec<RoleAccess>> {
        let rows = sqlx::query("SELECT role_id, ap_id FROM role_access")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(parse_row).collect()
    }

    pub async fn exists_in(&self, conn: &mut AnyConnection, grant: &RoleAccess) -> Result<bool> {
        let row = sqlx::query("SELECT role_id FROM role_access WHERE role_id = ? AND ap_id = ?")
            .bind(grant.role_id)
            .bind(grant.ap_id)
            .fetch_optional(conn)
            .await?;
        Ok(row.is_some())
    }

    pub async fn insert(&self, conn: &mut AnyConnection, grant: &RoleAccess) -> Result<()> {
        sqlx::query("INSERT INTO role_access (role_id, ap_id) VALUES (?, ?)")
            .bind(grant.role_id)
            .bind(grant.ap_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, conn: &mut AnyConnection, grant: &RoleAccess) -> Result<u64> {
        let result = sqlx::query("DELETE FROM role_access WHERE role_id = ? AND ap_id = ?")
            .bind(grant.role_id)
            .bind(grant.ap_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

fn parse_row(row: &AnyRow) -> Result<RoleAccess> {
    Ok(RoleAccess {
        role_id: row.try_get("role_id")?,
        ap_id: row.try_get("ap_id")?,
    })
}
