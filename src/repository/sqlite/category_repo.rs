// ==========================================
// 供应商目录系统 - 商品分类仓储（SQLite）
// ==========================================

use super::{lock, require_id, SharedConnection};
use crate::domain::{Category, RecordStatus};
use crate::repository::catalog_store::CategoryRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::{like_clause, like_contains, Placeholder};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

const SELECT_COLUMNS: &str = "id, name, parent_id, description, status";

pub struct SqliteCategoryRepository {
    conn: SharedConnection,
}

impl SqliteCategoryRepository {
    pub fn from_connection(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Category> {
        let status: String = row.get(4)?;
        Ok(Category {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            parent_id: row.get(2)?,
            description: row.get(3)?,
            status: RecordStatus::from_db_str(&status),
        })
    }

    fn query_list(&self, where_clause: &str, args: Vec<Value>) -> RepositoryResult<Vec<Category>> {
        let conn = lock(&self.conn)?;
        let sql = format!(
            "SELECT {} FROM categories {} ORDER BY name",
            SELECT_COLUMNS, where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), Self::map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn create_table(&self) -> RepositoryResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                parent_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
                description TEXT,
                status TEXT NOT NULL DEFAULT 'active',
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id);
            "#,
        )?;
        Ok(())
    }

    async fn save(&self, category: &Category) -> RepositoryResult<i64> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO categories (name, parent_id, description, status) VALUES (?1, ?2, ?3, ?4)",
            params![
                category.name,
                category.parent_id,
                category.description,
                category.status.to_db_str(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn update(&self, category: &Category) -> RepositoryResult<()> {
        let id = require_id(category.id, "categories")?;
        let conn = lock(&self.conn)?;
        let affected = conn.execute(
            r#"
            UPDATE categories
            SET name = ?1, parent_id = ?2, description = ?3, status = ?4,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?5
            "#,
            params![
                category.name,
                category.parent_id,
                category.description,
                category.status.to_db_str(),
                id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("categories", id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let conn = lock(&self.conn)?;
        let affected = conn.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Category>> {
        let conn = lock(&self.conn)?;
        let sql = format!("SELECT {} FROM categories WHERE id = ?1", SELECT_COLUMNS);
        Ok(conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Vec<Category>> {
        let clause = format!("WHERE {}", like_clause(Placeholder::Sqlite, "name", 1, false));
        self.query_list(&clause, vec![Value::Text(like_contains(name))])
    }

    async fn find_children(&self, parent_id: i64) -> RepositoryResult<Vec<Category>> {
        self.query_list("WHERE parent_id = ?1", vec![Value::Integer(parent_id)])
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Category>> {
        self.query_list("", Vec::new())
    }
}
