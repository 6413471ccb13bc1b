// ==========================================
// 供应商目录系统 - 供应商连接仓储（SQLite）
// ==========================================
// 说明: config 以 JSON 文本保存
// ==========================================

use super::{bag_from_text, bag_to_text, lock, require_id, SharedConnection};
use crate::domain::{ConnectionType, RecordStatus, VendorConnection};
use crate::repository::catalog_store::ConnectionRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::{like_clause, like_contains, Placeholder};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

const SELECT_COLUMNS: &str = "id, vendor_id, name, conn_type, config, status";

pub struct SqliteConnectionRepository {
    conn: SharedConnection,
}

impl SqliteConnectionRepository {
    pub fn from_connection(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<VendorConnection> {
        let conn_type: String = row.get(3)?;
        let config: Option<String> = row.get(4)?;
        let status: String = row.get(5)?;
        Ok(VendorConnection {
            id: Some(row.get(0)?),
            vendor_id: row.get(1)?,
            name: row.get(2)?,
            conn_type: ConnectionType::from_db_str(&conn_type),
            config: bag_from_text(config),
            status: RecordStatus::from_db_str(&status),
        })
    }

    fn query_list(
        &self,
        where_clause: &str,
        args: Vec<Value>,
    ) -> RepositoryResult<Vec<VendorConnection>> {
        let conn = lock(&self.conn)?;
        let sql = format!(
            "SELECT {} FROM connections {} ORDER BY name",
            SELECT_COLUMNS, where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), Self::map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[async_trait]
impl ConnectionRepository for SqliteConnectionRepository {
    async fn create_table(&self) -> RepositoryResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS connections (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                vendor_id INTEGER NOT NULL REFERENCES vendors(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                conn_type TEXT NOT NULL,
                config TEXT NOT NULL DEFAULT '{}',
                status TEXT NOT NULL DEFAULT 'active',
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_connections_vendor ON connections(vendor_id);
            "#,
        )?;
        Ok(())
    }

    async fn save(&self, connection: &VendorConnection) -> RepositoryResult<i64> {
        let config = bag_to_text(&connection.config)?;
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO connections (vendor_id, name, conn_type, config, status) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                connection.vendor_id,
                connection.name,
                connection.conn_type.to_db_str(),
                config,
                connection.status.to_db_str(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn update(&self, connection: &VendorConnection) -> RepositoryResult<()> {
        let id = require_id(connection.id, "connections")?;
        let config = bag_to_text(&connection.config)?;
        let conn = lock(&self.conn)?;
        let affected = conn.execute(
            r#"
            UPDATE connections
            SET vendor_id = ?1, name = ?2, conn_type = ?3, config = ?4, status = ?5,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?6
            "#,
            params![
                connection.vendor_id,
                connection.name,
                connection.conn_type.to_db_str(),
                config,
                connection.status.to_db_str(),
                id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("connections", id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let conn = lock(&self.conn)?;
        let affected = conn.execute("DELETE FROM connections WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<VendorConnection>> {
        let conn = lock(&self.conn)?;
        let sql = format!("SELECT {} FROM connections WHERE id = ?1", SELECT_COLUMNS);
        Ok(conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?)
    }

    async fn find_by_vendor(&self, vendor_id: i64) -> RepositoryResult<Vec<VendorConnection>> {
        self.query_list("WHERE vendor_id = ?1", vec![Value::Integer(vendor_id)])
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Vec<VendorConnection>> {
        let clause = format!("WHERE {}", like_clause(Placeholder::Sqlite, "name", 1, false));
        self.query_list(&clause, vec![Value::Text(like_contains(name))])
    }

    async fn find_all(&self) -> RepositoryResult<Vec<VendorConnection>> {
        self.query_list("", Vec::new())
    }
}
