//! Access Point Repository

use sqlx::any::AnyRow;
use sqlx::{Any, AnyConnection, AnyPool, Row, Transaction};

use crate::access_point::entity::{AccessPoint, AccessPointPayload};
use crate::shared::error::Result;
use crate::store::inserted_id;

const SELECT_ACCESS_POINTS: &str = "SELECT id, name, endpoint FROM access_points";

pub struct AccessPointRepository {
    pool: AnyPool,
}

impl AccessPointRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Any>> {
        Ok(self.pool.begin().await?)
    }

    pub async fn find_all(&self) -> Result<Vec<AccessPoint>> {
        let rows = sqlx::query(SELECT_ACCESS_POINTS).fetch_all(&self.pool).await?;
        rows.iter().map(parse_row).collect()
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<AccessPoint>> {
        let mut conn = self.pool.acquire().await?;
        self.find_by_id_in(&mut conn, id).await
    }

    pub async fn find_by_id_in(&self, conn: &mut AnyConnection, id: i64) -> Result<Option<AccessPoint>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_ACCESS_POINTS))
            .bind(id)
            .fetch_optional(conn)
            .await?;
        row.as_ref().map(parse_row).transpose()
    }

    pub async fn insert(&self, conn: &mut AnyConnection, payload: &AccessPointPayload) -> Result<AccessPoint> {
        let name = payload.name.trim();
        let endpoint = payload.endpoint.trim();
        let result = sqlx::query("INSERT INTO access_points (name, endpoint) VALUES (?, ?)")
            .bind(name)
            .bind(endpoint)
            .execute(&mut *conn)
            .await?;
        let id = inserted_id(conn, &result).await?;
        Ok(AccessPoint {
            id,
            name: name.to_string(),
            endpoint: endpoint.to_string(),
        })
    }

    pub async fn update(&self, conn: &mut AnyConnection, access_point: &AccessPoint) -> Result<u64> {
        let result = sqlx::query("UPDATE access_points SET name = ?, endpoint = ? WHERE id = ?")
            .bind(&access_point.name)
            .bind(&access_point.endpoint)
            .bind(access_point.id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, conn: &mut AnyConnection, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM access_points WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

fn parse_row(row: &AnyRow) -> Result<AccessPoint> {
    Ok(AccessPoint {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        endpoint: row.try_get("endpoint")?,
    })
}
