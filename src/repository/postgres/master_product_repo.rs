// ==========================================
// 供应商目录系统 - 主商品仓储（PostgreSQL）
// ==========================================

use super::{bag_from_json, bag_to_json, execute_all, require_id};
use crate::domain::{MasterProduct, RecordStatus};
use crate::repository::catalog_store::MasterProductRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::{like_clause, like_contains, Placeholder};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const SELECT_COLUMNS: &str = "id, name, description, sku, upc, manufacturer, \
     manufacturer_part_number, category_id, specs, status";

pub struct PgMasterProductRepository {
    pool: PgPool,
}

impl PgMasterProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<MasterProduct, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(MasterProduct {
            id: Some(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            sku: row.try_get("sku")?,
            upc: row.try_get("upc")?,
            manufacturer: row.try_get("manufacturer")?,
            manufacturer_part_number: row.try_get("manufacturer_part_number")?,
            category_id: row.try_get("category_id")?,
            specs: bag_from_json(row.try_get("specs")?),
            status: RecordStatus::from_db_str(&status),
        })
    }

    async fn find_one_by(&self, column: &str, value: &str) -> RepositoryResult<Option<MasterProduct>> {
        let sql = format!(
            "SELECT {} FROM master_products WHERE {} = $1 LIMIT 1",
            SELECT_COLUMNS, column
        );
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Self::map_row).transpose()?)
    }
}

#[async_trait]
impl MasterProductRepository for PgMasterProductRepository {
    async fn create_table(&self) -> RepositoryResult<()> {
        execute_all(
            &self.pool,
            &[
                r#"
                CREATE TABLE IF NOT EXISTS master_products (
                    id BIGSERIAL PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT,
                    sku TEXT UNIQUE,
                    upc TEXT,
                    manufacturer TEXT,
                    manufacturer_part_number TEXT,
                    category_id BIGINT REFERENCES categories(id) ON DELETE SET NULL,
                    specs JSONB NOT NULL DEFAULT '{}'::jsonb,
                    status TEXT NOT NULL DEFAULT 'active',
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )
                "#,
                "CREATE INDEX IF NOT EXISTS idx_master_products_upc ON master_products(upc)",
                "CREATE INDEX IF NOT EXISTS idx_master_products_mpn ON master_products(manufacturer, manufacturer_part_number)",
            ],
        )
        .await
    }

    async fn save(&self, product: &MasterProduct) -> RepositoryResult<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO master_products (
                name, description, sku, upc, manufacturer,
                manufacturer_part_number, category_id, specs, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.normalized_sku())
        .bind(product.normalized_upc())
        .bind(&product.manufacturer)
        .bind(&product.manufacturer_part_number)
        .bind(product.category_id)
        .bind(bag_to_json(&product.specs))
        .bind(product.status.to_db_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("id")?)
    }

    async fn update(&self, product: &MasterProduct) -> RepositoryResult<()> {
        let id = require_id(product.id, "master_products")?;
        let result = sqlx::query(
            r#"
            UPDATE master_products
            SET name = $1, description = $2, sku = $3, upc = $4, manufacturer = $5,
                manufacturer_part_number = $6, category_id = $7, specs = $8, status = $9,
                updated_at = now()
            WHERE id = $10
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.normalized_sku())
        .bind(product.normalized_upc())
        .bind(&product.manufacturer)
        .bind(&product.manufacturer_part_number)
        .bind(product.category_id)
        .bind(bag_to_json(&product.specs))
        .bind(product.status.to_db_str())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("master_products", id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM master_products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<MasterProduct>> {
        let sql = format!("SELECT {} FROM master_products WHERE id = $1", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Self::map_row).transpose()?)
    }

    async fn find_by_sku(&self, sku: &str) -> RepositoryResult<Option<MasterProduct>> {
        self.find_one_by("sku", sku).await
    }

    async fn find_by_upc(&self, upc: &str) -> RepositoryResult<Option<MasterProduct>> {
        self.find_one_by("upc", upc).await
    }

    async fn find_by_mpn(
        &self,
        manufacturer: &str,
        mpn: &str,
    ) -> RepositoryResult<Option<MasterProduct>> {
        let sql = format!(
            "SELECT {} FROM master_products WHERE manufacturer = $1 AND manufacturer_part_number = $2 LIMIT 1",
            SELECT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(manufacturer)
            .bind(mpn)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Self::map_row).transpose()?)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Vec<MasterProduct>> {
        let sql = format!(
            "SELECT {} FROM master_products WHERE {} ORDER BY name",
            SELECT_COLUMNS,
            like_clause(Placeholder::Postgres, "name", 1, true)
        );
        let rows = sqlx::query(&sql)
            .bind(like_contains(name))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(Self::map_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<MasterProduct>> {
        let sql = format!("SELECT {} FROM master_products ORDER BY name", SELECT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(Self::map_row).collect::<Result<Vec<_>, _>>()?)
    }
}
