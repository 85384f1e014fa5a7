//! User Repository

use sqlx::any::AnyRow;
use sqlx::{Any, AnyConnection, AnyPool, QueryBuilder, Row, Transaction};
use tracing::debug;

use crate::shared::error::Result;
use crate::user::entity::User;
use crate::user::filter::UserFilter;

const SELECT_USERS: &str = "SELECT id, first_name, last_name, email, role FROM users";

pub struct UserRepository {
    pool: AnyPool,
}

impl UserRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Any>> {
        Ok(self.pool.begin().await?)
    }

    pub async fn find(&self, filter: &UserFilter) -> Result<Vec<User>> {
        let mut qb = QueryBuilder::<Any>::new(SELECT_USERS);
        filter.push_where(&mut qb);
        debug!(sql = qb.sql(), "Querying users");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(parse_row).collect()
    }

    /// One window of the table in storage order.
    pub async fn find_page(&self, offset: i64, limit: i64) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!("{} LIMIT ? OFFSET ?", SELECT_USERS))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(parse_row).collect()
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let mut conn = self.pool.acquire().await?;
        self.find_by_id_in(&mut conn, id).await
    }

    /// Lookup on an existing connection, typically inside a transaction.
    pub async fn find_by_id_in(&self, conn: &mut AnyConnection, id: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_USERS))
            .bind(id)
            .fetch_optional(conn)
            .await?;
        row.as_ref().map(parse_row).transpose()
    }

    pub async fn insert(&self, conn: &mut AnyConnection, user: &User) -> Result<()> {
        sqlx::query("INSERT INTO users (id, first_name, last_name, email, role) VALUES (?, ?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(user.role)
            .execute(conn)
            .await?;
        debug!(user_id = %user.id, "Inserted user");
        Ok(())
    }

    /// Overwrite every mutable column. Returns the number of rows touched.
    pub async fn update(&self, conn: &mut AnyConnection, user: &User) -> Result<u64> {
        let result = sqlx::query("UPDATE users SET first_name = ?, last_name = ?, email = ?, role = ? WHERE id = ?")
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(user.role)
            .bind(&user.id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, conn: &mut AnyConnection, id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

fn parse_row(row: &AnyRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        role: row.try_get("role")?,
    })
}
