// ==========================================
// 供应商目录系统 - 供应商仓储（PostgreSQL）
// ==========================================

use super::{execute_all, require_id};
use crate::domain::{RecordStatus, Vendor};
use crate::repository::catalog_store::VendorRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::{like_clause, like_contains, Placeholder};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const SELECT_COLUMNS: &str = "id, name, description, contact_info, status";

pub struct PgVendorRepository {
    pool: PgPool,
}

impl PgVendorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<Vendor, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Vendor {
            id: Some(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            contact_info: row.try_get("contact_info")?,
            status: RecordStatus::from_db_str(&status),
        })
    }
}

#[async_trait]
impl VendorRepository for PgVendorRepository {
    async fn create_table(&self) -> RepositoryResult<()> {
        execute_all(
            &self.pool,
            &[r#"
            CREATE TABLE IF NOT EXISTS vendors (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                contact_info TEXT,
                status TEXT NOT NULL DEFAULT 'active',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#],
        )
        .await
    }

    async fn save(&self, vendor: &Vendor) -> RepositoryResult<i64> {
        let row = sqlx::query(
            "INSERT INTO vendors (name, description, contact_info, status) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&vendor.name)
        .bind(&vendor.description)
        .bind(&vendor.contact_info)
        .bind(vendor.status.to_db_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("id")?)
    }

    async fn update(&self, vendor: &Vendor) -> RepositoryResult<()> {
        let id = require_id(vendor.id, "vendors")?;
        let result = sqlx::query(
            r#"
            UPDATE vendors
            SET name = $1, description = $2, contact_info = $3, status = $4, updated_at = now()
            WHERE id = $5
            "#,
        )
        .bind(&vendor.name)
        .bind(&vendor.description)
        .bind(&vendor.contact_info)
        .bind(vendor.status.to_db_str())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("vendors", id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM vendors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Vendor>> {
        let sql = format!("SELECT {} FROM vendors WHERE id = $1", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Self::map_row).transpose()?)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Vec<Vendor>> {
        let sql = format!(
            "SELECT {} FROM vendors WHERE {} ORDER BY name",
            SELECT_COLUMNS,
            like_clause(Placeholder::Postgres, "name", 1, true)
        );
        let rows = sqlx::query(&sql)
            .bind(like_contains(name))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(Self::map_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Vendor>> {
        let sql = format!("SELECT {} FROM vendors ORDER BY name", SELECT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(Self::map_row).collect::<Result<Vec<_>, _>>()?)
    }
}
