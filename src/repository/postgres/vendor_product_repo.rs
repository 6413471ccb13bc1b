// ==========================================
// 供应商目录系统 - 供应商商品仓储（PostgreSQL）
// ==========================================
// 自然键: UNIQUE(vendor_id, vendor_sku)
// 批量写入: 多行 INSERT ... ON CONFLICT DO UPDATE（单事务）
// ==========================================

use super::{bag_from_json, bag_to_json, execute_all, require_id};
use crate::domain::{RecordStatus, VendorProduct};
use crate::repository::catalog_store::VendorProductRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::{
    in_list, vendor_product_upsert, Placeholder, VENDOR_PRODUCT_WRITE_COLUMNS,
};
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use tracing::debug;

const SELECT_COLUMNS: &str = "id, vendor_id, master_product_id, vendor_sku, \
     vendor_price, list_price, map_price, mrp_price, \
     quantity, quantity_nj, quantity_fl, eta, eta_nj, eta_fl, \
     shipping_weight, shipping_dimensions, props, status";

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

pub struct PgVendorProductRepository {
    pool: PgPool,
}

impl PgVendorProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<VendorProduct, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(VendorProduct {
            id: Some(row.try_get("id")?),
            vendor_id: row.try_get("vendor_id")?,
            master_product_id: row.try_get("master_product_id")?,
            vendor_sku: row.try_get("vendor_sku")?,
            vendor_price: row.try_get("vendor_price")?,
            list_price: row.try_get("list_price")?,
            map_price: row.try_get("map_price")?,
            mrp_price: row.try_get("mrp_price")?,
            quantity: row.try_get("quantity")?,
            quantity_nj: row.try_get("quantity_nj")?,
            quantity_fl: row.try_get("quantity_fl")?,
            eta: row.try_get("eta")?,
            eta_nj: row.try_get("eta_nj")?,
            eta_fl: row.try_get("eta_fl")?,
            shipping_weight: row.try_get("shipping_weight")?,
            shipping_dimensions: row.try_get("shipping_dimensions")?,
            props: bag_from_json(row.try_get("props")?),
            status: RecordStatus::from_db_str(&status),
        })
    }

    fn map_rows(rows: Vec<PgRow>) -> RepositoryResult<Vec<VendorProduct>> {
        Ok(rows.iter().map(Self::map_row).collect::<Result<Vec<_>, _>>()?)
    }

    /// 按 VENDOR_PRODUCT_WRITE_COLUMNS 顺序绑定
    fn bind_product<'q>(query: PgQuery<'q>, product: &VendorProduct) -> PgQuery<'q> {
        query
            .bind(product.vendor_id)
            .bind(product.master_product_id)
            .bind(product.vendor_sku.clone())
            .bind(product.vendor_price)
            .bind(product.list_price)
            .bind(product.map_price)
            .bind(product.mrp_price)
            .bind(product.quantity)
            .bind(product.quantity_nj)
            .bind(product.quantity_fl)
            .bind(product.eta.clone())
            .bind(product.eta_nj.clone())
            .bind(product.eta_fl.clone())
            .bind(product.shipping_weight)
            .bind(product.shipping_dimensions.clone())
            .bind(bag_to_json(&product.props))
            .bind(product.status.to_db_str())
    }
}

#[async_trait]
impl VendorProductRepository for PgVendorProductRepository {
    async fn create_table(&self) -> RepositoryResult<()> {
        execute_all(
            &self.pool,
            &[
                r#"
                CREATE TABLE IF NOT EXISTS vendor_products (
                    id BIGSERIAL PRIMARY KEY,
                    vendor_id BIGINT NOT NULL REFERENCES vendors(id) ON DELETE CASCADE,
                    master_product_id BIGINT REFERENCES master_products(id) ON DELETE SET NULL,
                    vendor_sku TEXT NOT NULL,
                    vendor_price DOUBLE PRECISION,
                    list_price DOUBLE PRECISION,
                    map_price DOUBLE PRECISION,
                    mrp_price DOUBLE PRECISION,
                    quantity BIGINT NOT NULL DEFAULT 0,
                    quantity_nj BIGINT NOT NULL DEFAULT 0,
                    quantity_fl BIGINT NOT NULL DEFAULT 0,
                    eta TEXT,
                    eta_nj TEXT,
                    eta_fl TEXT,
                    shipping_weight DOUBLE PRECISION,
                    shipping_dimensions TEXT,
                    props JSONB NOT NULL DEFAULT '{}'::jsonb,
                    status TEXT NOT NULL DEFAULT 'active',
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    UNIQUE (vendor_id, vendor_sku)
                )
                "#,
                "CREATE INDEX IF NOT EXISTS idx_vendor_products_master ON vendor_products(master_product_id)",
            ],
        )
        .await
    }

    async fn save(&self, product: &VendorProduct) -> RepositoryResult<i64> {
        let sql = format!(
            "INSERT INTO vendor_products ({}) VALUES ({}) RETURNING id",
            VENDOR_PRODUCT_WRITE_COLUMNS.join(", "),
            in_list(Placeholder::Postgres, 1, VENDOR_PRODUCT_WRITE_COLUMNS.len())
        );
        let row = Self::bind_product(sqlx::query(&sql), product)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("id")?)
    }

    async fn update(&self, product: &VendorProduct) -> RepositoryResult<()> {
        let id = require_id(product.id, "vendor_products")?;
        let assignments = VENDOR_PRODUCT_WRITE_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{} = ${}", col, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE vendor_products SET {}, updated_at = now() WHERE id = ${}",
            assignments,
            VENDOR_PRODUCT_WRITE_COLUMNS.len() + 1
        );

        let result = Self::bind_product(sqlx::query(&sql), product)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("vendor_products", id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM vendor_products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<VendorProduct>> {
        let sql = format!("SELECT {} FROM vendor_products WHERE id = $1", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Self::map_row).transpose()?)
    }

    async fn find_by_vendor_sku(
        &self,
        vendor_id: i64,
        vendor_sku: &str,
    ) -> RepositoryResult<Option<VendorProduct>> {
        let sql = format!(
            "SELECT {} FROM vendor_products WHERE vendor_id = $1 AND vendor_sku = $2",
            SELECT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(vendor_id)
            .bind(vendor_sku)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Self::map_row).transpose()?)
    }

    async fn find_by_vendor_skus(
        &self,
        vendor_id: i64,
        vendor_skus: &[String],
    ) -> RepositoryResult<Vec<VendorProduct>> {
        if vendor_skus.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM vendor_products WHERE vendor_id = $1 AND vendor_sku = ANY($2)",
            SELECT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(vendor_id)
            .bind(vendor_skus.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Self::map_rows(rows)
    }

    async fn find_by_vendor(&self, vendor_id: i64) -> RepositoryResult<Vec<VendorProduct>> {
        let sql = format!(
            "SELECT {} FROM vendor_products WHERE vendor_id = $1 ORDER BY vendor_sku",
            SELECT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(vendor_id)
            .fetch_all(&self.pool)
            .await?;
        Self::map_rows(rows)
    }

    async fn find_by_master_product(
        &self,
        master_product_id: i64,
    ) -> RepositoryResult<Vec<VendorProduct>> {
        let sql = format!(
            "SELECT {} FROM vendor_products WHERE master_product_id = $1 ORDER BY vendor_id, vendor_sku",
            SELECT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(master_product_id)
            .fetch_all(&self.pool)
            .await?;
        Self::map_rows(rows)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<VendorProduct>> {
        let sql = format!(
            "SELECT {} FROM vendor_products ORDER BY vendor_id, vendor_sku",
            SELECT_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Self::map_rows(rows)
    }

    async fn count_by_vendor(&self, vendor_id: i64) -> RepositoryResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM vendor_products WHERE vendor_id = $1")
            .bind(vendor_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }

    async fn upsert_many(&self, products: &[VendorProduct]) -> RepositoryResult<usize> {
        if products.is_empty() {
            return Ok(0);
        }

        let sql = vendor_product_upsert(Placeholder::Postgres, products.len(), "::jsonb");
        let mut query = sqlx::query(&sql);
        for product in products {
            query = Self::bind_product(query, product);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        query.execute(&mut *tx).await?;
        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(rows = products.len(), "vendor_products 批量 upsert 完成");
        Ok(products.len())
    }
}
