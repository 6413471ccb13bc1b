// ==========================================
// 供应商目录系统 - 主商品仓储（SQLite）
// ==========================================
// 约束: sku 非空时唯一（UNIQUE 允许多个 NULL）；空白 sku / upc 写入 NULL
// ==========================================

use super::{bag_from_text, bag_to_text, lock, require_id, SharedConnection};
use crate::domain::{MasterProduct, RecordStatus};
use crate::repository::catalog_store::MasterProductRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::{like_clause, like_contains, Placeholder};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

const SELECT_COLUMNS: &str = "id, name, description, sku, upc, manufacturer, \
     manufacturer_part_number, category_id, specs, status";

pub struct SqliteMasterProductRepository {
    conn: SharedConnection,
}

impl SqliteMasterProductRepository {
    pub fn from_connection(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<MasterProduct> {
        let specs: Option<String> = row.get(8)?;
        let status: String = row.get(9)?;
        Ok(MasterProduct {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            description: row.get(2)?,
            sku: row.get(3)?,
            upc: row.get(4)?,
            manufacturer: row.get(5)?,
            manufacturer_part_number: row.get(6)?,
            category_id: row.get(7)?,
            specs: bag_from_text(specs),
            status: RecordStatus::from_db_str(&status),
        })
    }

    fn query_one(&self, where_clause: &str, args: Vec<Value>) -> RepositoryResult<Option<MasterProduct>> {
        let conn = lock(&self.conn)?;
        let sql = format!(
            "SELECT {} FROM master_products {} LIMIT 1",
            SELECT_COLUMNS, where_clause
        );
        Ok(conn
            .query_row(&sql, params_from_iter(args), Self::map_row)
            .optional()?)
    }

    fn query_list(&self, where_clause: &str, args: Vec<Value>) -> RepositoryResult<Vec<MasterProduct>> {
        let conn = lock(&self.conn)?;
        let sql = format!(
            "SELECT {} FROM master_products {} ORDER BY name",
            SELECT_COLUMNS, where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), Self::map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[async_trait]
impl MasterProductRepository for SqliteMasterProductRepository {
    async fn create_table(&self) -> RepositoryResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS master_products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                sku TEXT UNIQUE,
                upc TEXT,
                manufacturer TEXT,
                manufacturer_part_number TEXT,
                category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
                specs TEXT NOT NULL DEFAULT '{}',
                status TEXT NOT NULL DEFAULT 'active',
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_master_products_upc ON master_products(upc);
            CREATE INDEX IF NOT EXISTS idx_master_products_mpn
                ON master_products(manufacturer, manufacturer_part_number);
            "#,
        )?;
        Ok(())
    }

    async fn save(&self, product: &MasterProduct) -> RepositoryResult<i64> {
        let specs = bag_to_text(&product.specs)?;
        let conn = lock(&self.conn)?;
        conn.execute(
            r#"
            INSERT INTO master_products (
                name, description, sku, upc, manufacturer,
                manufacturer_part_number, category_id, specs, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                product.name,
                product.description,
                product.normalized_sku(),
                product.normalized_upc(),
                product.manufacturer,
                product.manufacturer_part_number,
                product.category_id,
                specs,
                product.status.to_db_str(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn update(&self, product: &MasterProduct) -> RepositoryResult<()> {
        let id = require_id(product.id, "master_products")?;
        let specs = bag_to_text(&product.specs)?;
        let conn = lock(&self.conn)?;
        let affected = conn.execute(
            r#"
            UPDATE master_products
            SET name = ?1, description = ?2, sku = ?3, upc = ?4, manufacturer = ?5,
                manufacturer_part_number = ?6, category_id = ?7, specs = ?8, status = ?9,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?10
            "#,
            params![
                product.name,
                product.description,
                product.normalized_sku(),
                product.normalized_upc(),
                product.manufacturer,
                product.manufacturer_part_number,
                product.category_id,
                specs,
                product.status.to_db_str(),
                id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("master_products", id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let conn = lock(&self.conn)?;
        let affected = conn.execute("DELETE FROM master_products WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<MasterProduct>> {
        self.query_one("WHERE id = ?1", vec![Value::Integer(id)])
    }

    async fn find_by_sku(&self, sku: &str) -> RepositoryResult<Option<MasterProduct>> {
        self.query_one("WHERE sku = ?1", vec![Value::Text(sku.to_string())])
    }

    async fn find_by_upc(&self, upc: &str) -> RepositoryResult<Option<MasterProduct>> {
        self.query_one("WHERE upc = ?1", vec![Value::Text(upc.to_string())])
    }

    async fn find_by_mpn(
        &self,
        manufacturer: &str,
        mpn: &str,
    ) -> RepositoryResult<Option<MasterProduct>> {
        self.query_one(
            "WHERE manufacturer = ?1 AND manufacturer_part_number = ?2",
            vec![
                Value::Text(manufacturer.to_string()),
                Value::Text(mpn.to_string()),
            ],
        )
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Vec<MasterProduct>> {
        let clause = format!("WHERE {}", like_clause(Placeholder::Sqlite, "name", 1, false));
        self.query_list(&clause, vec![Value::Text(like_contains(name))])
    }

    async fn find_all(&self) -> RepositoryResult<Vec<MasterProduct>> {
        self.query_list("", Vec::new())
    }
}
