// ==========================================
// 供应商目录系统 - 供应商商品仓储（SQLite）
// ==========================================
// 自然键: UNIQUE(vendor_id, vendor_sku)
// 批量写入: 多行 INSERT ... ON CONFLICT DO UPDATE（单事务）
// ==========================================

use super::{bag_from_text, bag_to_text, lock, require_id, SharedConnection};
use crate::domain::{RecordStatus, VendorProduct};
use crate::repository::catalog_store::VendorProductRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::{
    in_list, vendor_product_upsert, Placeholder, VENDOR_PRODUCT_WRITE_COLUMNS,
};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use tracing::debug;

const SELECT_COLUMNS: &str = "id, vendor_id, master_product_id, vendor_sku, \
     vendor_price, list_price, map_price, mrp_price, \
     quantity, quantity_nj, quantity_fl, eta, eta_nj, eta_fl, \
     shipping_weight, shipping_dimensions, props, status";

pub struct SqliteVendorProductRepository {
    conn: SharedConnection,
}

impl SqliteVendorProductRepository {
    pub fn from_connection(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<VendorProduct> {
        let props: Option<String> = row.get(16)?;
        let status: String = row.get(17)?;
        Ok(VendorProduct {
            id: Some(row.get(0)?),
            vendor_id: row.get(1)?,
            master_product_id: row.get(2)?,
            vendor_sku: row.get(3)?,
            vendor_price: row.get(4)?,
            list_price: row.get(5)?,
            map_price: row.get(6)?,
            mrp_price: row.get(7)?,
            quantity: row.get::<_, Option<i64>>(8)?.unwrap_or(0),
            quantity_nj: row.get::<_, Option<i64>>(9)?.unwrap_or(0),
            quantity_fl: row.get::<_, Option<i64>>(10)?.unwrap_or(0),
            eta: row.get(11)?,
            eta_nj: row.get(12)?,
            eta_fl: row.get(13)?,
            shipping_weight: row.get(14)?,
            shipping_dimensions: row.get(15)?,
            props: bag_from_text(props),
            status: RecordStatus::from_db_str(&status),
        })
    }

    /// 按 VENDOR_PRODUCT_WRITE_COLUMNS 顺序生成绑定值
    fn write_values(product: &VendorProduct) -> RepositoryResult<Vec<Value>> {
        Ok(vec![
            Value::Integer(product.vendor_id),
            Value::from(product.master_product_id),
            Value::Text(product.vendor_sku.clone()),
            Value::from(product.vendor_price),
            Value::from(product.list_price),
            Value::from(product.map_price),
            Value::from(product.mrp_price),
            Value::Integer(product.quantity),
            Value::Integer(product.quantity_nj),
            Value::Integer(product.quantity_fl),
            Value::from(product.eta.clone()),
            Value::from(product.eta_nj.clone()),
            Value::from(product.eta_fl.clone()),
            Value::from(product.shipping_weight),
            Value::from(product.shipping_dimensions.clone()),
            Value::Text(bag_to_text(&product.props)?),
            Value::Text(product.status.to_db_str().to_string()),
        ])
    }

    fn query_list(&self, where_clause: &str, args: Vec<Value>) -> RepositoryResult<Vec<VendorProduct>> {
        let conn = lock(&self.conn)?;
        let sql = format!(
            "SELECT {} FROM vendor_products {} ORDER BY vendor_id, vendor_sku",
            SELECT_COLUMNS, where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), Self::map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[async_trait]
impl VendorProductRepository for SqliteVendorProductRepository {
    async fn create_table(&self) -> RepositoryResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS vendor_products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                vendor_id INTEGER NOT NULL REFERENCES vendors(id) ON DELETE CASCADE,
                master_product_id INTEGER REFERENCES master_products(id) ON DELETE SET NULL,
                vendor_sku TEXT NOT NULL,
                vendor_price REAL,
                list_price REAL,
                map_price REAL,
                mrp_price REAL,
                quantity INTEGER NOT NULL DEFAULT 0,
                quantity_nj INTEGER NOT NULL DEFAULT 0,
                quantity_fl INTEGER NOT NULL DEFAULT 0,
                eta TEXT,
                eta_nj TEXT,
                eta_fl TEXT,
                shipping_weight REAL,
                shipping_dimensions TEXT,
                props TEXT NOT NULL DEFAULT '{}',
                status TEXT NOT NULL DEFAULT 'active',
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (vendor_id, vendor_sku)
            );
            CREATE INDEX IF NOT EXISTS idx_vendor_products_master
                ON vendor_products(master_product_id);
            "#,
        )?;
        Ok(())
    }

    async fn save(&self, product: &VendorProduct) -> RepositoryResult<i64> {
        let values = Self::write_values(product)?;
        let sql = format!(
            "INSERT INTO vendor_products ({}) VALUES ({})",
            VENDOR_PRODUCT_WRITE_COLUMNS.join(", "),
            in_list(Placeholder::Sqlite, 1, VENDOR_PRODUCT_WRITE_COLUMNS.len())
        );
        let conn = lock(&self.conn)?;
        conn.execute(&sql, params_from_iter(values))?;
        Ok(conn.last_insert_rowid())
    }

    async fn update(&self, product: &VendorProduct) -> RepositoryResult<()> {
        let id = require_id(product.id, "vendor_products")?;
        let mut values = Self::write_values(product)?;
        let assignments = VENDOR_PRODUCT_WRITE_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{} = ?{}", col, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE vendor_products SET {}, updated_at = CURRENT_TIMESTAMP WHERE id = ?{}",
            assignments,
            VENDOR_PRODUCT_WRITE_COLUMNS.len() + 1
        );
        values.push(Value::Integer(id));

        let conn = lock(&self.conn)?;
        let affected = conn.execute(&sql, params_from_iter(values))?;
        if affected == 0 {
            return Err(RepositoryError::not_found("vendor_products", id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let conn = lock(&self.conn)?;
        let affected = conn.execute("DELETE FROM vendor_products WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<VendorProduct>> {
        let conn = lock(&self.conn)?;
        let sql = format!("SELECT {} FROM vendor_products WHERE id = ?1", SELECT_COLUMNS);
        Ok(conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?)
    }

    async fn find_by_vendor_sku(
        &self,
        vendor_id: i64,
        vendor_sku: &str,
    ) -> RepositoryResult<Option<VendorProduct>> {
        let conn = lock(&self.conn)?;
        let sql = format!(
            "SELECT {} FROM vendor_products WHERE vendor_id = ?1 AND vendor_sku = ?2",
            SELECT_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![vendor_id, vendor_sku], Self::map_row)
            .optional()?)
    }

    async fn find_by_vendor_skus(
        &self,
        vendor_id: i64,
        vendor_skus: &[String],
    ) -> RepositoryResult<Vec<VendorProduct>> {
        if vendor_skus.is_empty() {
            return Ok(Vec::new());
        }
        let mut args = Vec::with_capacity(vendor_skus.len() + 1);
        args.push(Value::Integer(vendor_id));
        args.extend(vendor_skus.iter().map(|s| Value::Text(s.clone())));

        let where_clause = format!(
            "WHERE vendor_id = ?1 AND vendor_sku IN ({})",
            in_list(Placeholder::Sqlite, 2, vendor_skus.len())
        );
        self.query_list(&where_clause, args)
    }

    async fn find_by_vendor(&self, vendor_id: i64) -> RepositoryResult<Vec<VendorProduct>> {
        self.query_list("WHERE vendor_id = ?1", vec![Value::Integer(vendor_id)])
    }

    async fn find_by_master_product(
        &self,
        master_product_id: i64,
    ) -> RepositoryResult<Vec<VendorProduct>> {
        self.query_list(
            "WHERE master_product_id = ?1",
            vec![Value::Integer(master_product_id)],
        )
    }

    async fn find_all(&self) -> RepositoryResult<Vec<VendorProduct>> {
        self.query_list("", Vec::new())
    }

    async fn count_by_vendor(&self, vendor_id: i64) -> RepositoryResult<i64> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM vendor_products WHERE vendor_id = ?1",
            params![vendor_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    async fn upsert_many(&self, products: &[VendorProduct]) -> RepositoryResult<usize> {
        if products.is_empty() {
            return Ok(0);
        }

        let mut values = Vec::with_capacity(products.len() * VENDOR_PRODUCT_WRITE_COLUMNS.len());
        for product in products {
            values.extend(Self::write_values(product)?);
        }
        let sql = vendor_product_upsert(Placeholder::Sqlite, products.len(), "");

        let conn = lock(&self.conn)?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        tx.execute(&sql, params_from_iter(values))?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(rows = products.len(), "vendor_products 批量 upsert 完成");
        Ok(products.len())
    }
}
