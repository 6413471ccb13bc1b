// ==========================================
// 供应商目录系统 - 供应商连接仓储（PostgreSQL）
// ==========================================

use super::{bag_from_json, bag_to_json, execute_all, require_id};
use crate::domain::{ConnectionType, RecordStatus, VendorConnection};
use crate::repository::catalog_store::ConnectionRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::{like_clause, like_contains, Placeholder};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const SELECT_COLUMNS: &str = "id, vendor_id, name, conn_type, config, status";

pub struct PgConnectionRepository {
    pool: PgPool,
}

impl PgConnectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<VendorConnection, sqlx::Error> {
        let conn_type: String = row.try_get("conn_type")?;
        let status: String = row.try_get("status")?;
        Ok(VendorConnection {
            id: Some(row.try_get("id")?),
            vendor_id: row.try_get("vendor_id")?,
            name: row.try_get("name")?,
            conn_type: ConnectionType::from_db_str(&conn_type),
            config: bag_from_json(row.try_get("config")?),
            status: RecordStatus::from_db_str(&status),
        })
    }

    fn map_rows(rows: Vec<PgRow>) -> RepositoryResult<Vec<VendorConnection>> {
        Ok(rows.iter().map(Self::map_row).collect::<Result<Vec<_>, _>>()?)
    }
}

#[async_trait]
impl ConnectionRepository for PgConnectionRepository {
    async fn create_table(&self) -> RepositoryResult<()> {
        execute_all(
            &self.pool,
            &[
                r#"
                CREATE TABLE IF NOT EXISTS connections (
                    id BIGSERIAL PRIMARY KEY,
                    vendor_id BIGINT NOT NULL REFERENCES vendors(id) ON DELETE CASCADE,
                    name TEXT NOT NULL,
                    conn_type TEXT NOT NULL,
                    config JSONB NOT NULL DEFAULT '{}'::jsonb,
                    status TEXT NOT NULL DEFAULT 'active',
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )
                "#,
                "CREATE INDEX IF NOT EXISTS idx_connections_vendor ON connections(vendor_id)",
            ],
        )
        .await
    }

    async fn save(&self, connection: &VendorConnection) -> RepositoryResult<i64> {
        let row = sqlx::query(
            "INSERT INTO connections (vendor_id, name, conn_type, config, status) VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(connection.vendor_id)
        .bind(&connection.name)
        .bind(connection.conn_type.to_db_str())
        .bind(bag_to_json(&connection.config))
        .bind(connection.status.to_db_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("id")?)
    }

    async fn update(&self, connection: &VendorConnection) -> RepositoryResult<()> {
        let id = require_id(connection.id, "connections")?;
        let result = sqlx::query(
            r#"
            UPDATE connections
            SET vendor_id = $1, name = $2, conn_type = $3, config = $4, status = $5,
                updated_at = now()
            WHERE id = $6
            "#,
        )
        .bind(connection.vendor_id)
        .bind(&connection.name)
        .bind(connection.conn_type.to_db_str())
        .bind(bag_to_json(&connection.config))
        .bind(connection.status.to_db_str())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("connections", id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM connections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<VendorConnection>> {
        let sql = format!("SELECT {} FROM connections WHERE id = $1", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Self::map_row).transpose()?)
    }

    async fn find_by_vendor(&self, vendor_id: i64) -> RepositoryResult<Vec<VendorConnection>> {
        let sql = format!(
            "SELECT {} FROM connections WHERE vendor_id = $1 ORDER BY name",
            SELECT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(vendor_id)
            .fetch_all(&self.pool)
            .await?;
        Self::map_rows(rows)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Vec<VendorConnection>> {
        let sql = format!(
            "SELECT {} FROM connections WHERE {} ORDER BY name",
            SELECT_COLUMNS,
            like_clause(Placeholder::Postgres, "name", 1, true)
        );
        let rows = sqlx::query(&sql)
            .bind(like_contains(name))
            .fetch_all(&self.pool)
            .await?;
        Self::map_rows(rows)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<VendorConnection>> {
        let sql = format!("SELECT {} FROM connections ORDER BY name", SELECT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Self::map_rows(rows)
    }
}
