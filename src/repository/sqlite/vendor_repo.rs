// ==========================================
// 供应商目录系统 - 供应商仓储（SQLite）
// ==========================================

use super::{lock, require_id, SharedConnection};
use crate::domain::{RecordStatus, Vendor};
use crate::repository::catalog_store::VendorRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::{like_clause, like_contains, Placeholder};
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};

const SELECT_COLUMNS: &str = "id, name, description, contact_info, status";

pub struct SqliteVendorRepository {
    conn: SharedConnection,
}

impl SqliteVendorRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Vendor> {
        let status: String = row.get(4)?;
        Ok(Vendor {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            description: row.get(2)?,
            contact_info: row.get(3)?,
            status: RecordStatus::from_db_str(&status),
        })
    }

    fn query_list(&self, sql: &str, arg: Option<String>) -> RepositoryResult<Vec<Vendor>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(sql)?;
        let rows = match arg {
            Some(a) => stmt.query_map(params![a], Self::map_row)?,
            None => stmt.query_map([], Self::map_row)?,
        };
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[async_trait]
impl VendorRepository for SqliteVendorRepository {
    async fn create_table(&self) -> RepositoryResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS vendors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                contact_info TEXT,
                status TEXT NOT NULL DEFAULT 'active',
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )?;
        Ok(())
    }

    async fn save(&self, vendor: &Vendor) -> RepositoryResult<i64> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO vendors (name, description, contact_info, status) VALUES (?1, ?2, ?3, ?4)",
            params![
                vendor.name,
                vendor.description,
                vendor.contact_info,
                vendor.status.to_db_str(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn update(&self, vendor: &Vendor) -> RepositoryResult<()> {
        let id = require_id(vendor.id, "vendors")?;
        let conn = lock(&self.conn)?;
        let affected = conn.execute(
            r#"
            UPDATE vendors
            SET name = ?1, description = ?2, contact_info = ?3, status = ?4,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?5
            "#,
            params![
                vendor.name,
                vendor.description,
                vendor.contact_info,
                vendor.status.to_db_str(),
                id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("vendors", id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let conn = lock(&self.conn)?;
        let affected = conn.execute("DELETE FROM vendors WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Vendor>> {
        let conn = lock(&self.conn)?;
        let sql = format!("SELECT {} FROM vendors WHERE id = ?1", SELECT_COLUMNS);
        Ok(conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Vec<Vendor>> {
        let sql = format!(
            "SELECT {} FROM vendors WHERE {} ORDER BY name",
            SELECT_COLUMNS,
            like_clause(Placeholder::Sqlite, "name", 1, false)
        );
        self.query_list(&sql, Some(like_contains(name)))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Vendor>> {
        let sql = format!("SELECT {} FROM vendors ORDER BY name", SELECT_COLUMNS);
        self.query_list(&sql, None)
    }
}
