//! Role Repository

use sqlx::any::AnyRow;
use sqlx::{Any, AnyConnection, AnyPool, Row, Transaction};

use crate::role::entity::Role;
use crate::shared::error::Result;
use crate::store::inserted_id;

const SELECT_ROLES: &str = "SELECT id, name FROM roles";

pub struct RoleRepository {
    pool: AnyPool,
}

impl RoleRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Any>> {
        Ok(self.pool.begin().await?)
    }

    pub async fn find_all(&self) -> Result<Vec<Role>> {
        let rows = sqlx::query(SELECT_ROLES).fetch_all(&self.pool).await?;
        rows.iter().map(parse_row).collect()
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Role>> {
        let mut conn = self.pool.acquire().await?;
        self.find_by_id_in(&mut conn, id).await
    }

    pub async fn find_by_id_in(&self, conn: &mut AnyConnection, id: i64) -> Result<Option<Role>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_ROLES))
            .bind(id)
            .fetch_optional(conn)
            .await?;
        row.as_ref().map(parse_row).transpose()
    }

    /// Insert and return the stored role with its assigned id.
    pub async fn insert(&self, conn: &mut AnyConnection, name: &str) -> Result<Role> {
        let result = sqlx::query("INSERT INTO roles (name) VALUES (?)")
            .bind(name)
            .execute(&mut *conn)
            .await?;
        let id = inserted_id(conn, &result).await?;
        Ok(Role { id, name: name.to_string() })
    }

    pub async fn update(&self, conn: &mut AnyConnection, role: &Role) -> Result<u64> {
        let result = sqlx::query("UPDATE roles SET name = ? WHERE id = ?")
            .bind(&role.name)
            .bind(role.id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, conn: &mut AnyConnection, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM roles WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

fn parse_row(row: &AnyRow) -> Result<Role> {
    Ok(Role {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}
