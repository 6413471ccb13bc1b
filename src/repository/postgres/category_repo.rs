// ==========================================
// 供应商目录系统 - 商品分类仓储（PostgreSQL）
// ==========================================

use super::{execute_all, require_id};
use crate::domain::{Category, RecordStatus};
use crate::repository::catalog_store::CategoryRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::{like_clause, like_contains, Placeholder};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const SELECT_COLUMNS: &str = "id, name, parent_id, description, status";

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<Category, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Category {
            id: Some(row.try_get("id")?),
            name: row.try_get("name")?,
            parent_id: row.try_get("parent_id")?,
            description: row.try_get("description")?,
            status: RecordStatus::from_db_str(&status),
        })
    }

    fn map_rows(rows: Vec<PgRow>) -> RepositoryResult<Vec<Category>> {
        Ok(rows.iter().map(Self::map_row).collect::<Result<Vec<_>, _>>()?)
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create_table(&self) -> RepositoryResult<()> {
        execute_all(
            &self.pool,
            &[
                r#"
                CREATE TABLE IF NOT EXISTS categories (
                    id BIGSERIAL PRIMARY KEY,
                    name TEXT NOT NULL,
                    parent_id BIGINT REFERENCES categories(id) ON DELETE SET NULL,
                    description TEXT,
                    status TEXT NOT NULL DEFAULT 'active',
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )
                "#,
                "CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id)",
            ],
        )
        .await
    }

    async fn save(&self, category: &Category) -> RepositoryResult<i64> {
        let row = sqlx::query(
            "INSERT INTO categories (name, parent_id, description, status) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&category.name)
        .bind(category.parent_id)
        .bind(&category.description)
        .bind(category.status.to_db_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("id")?)
    }

    async fn update(&self, category: &Category) -> RepositoryResult<()> {
        let id = require_id(category.id, "categories")?;
        let result = sqlx::query(
            r#"
            UPDATE categories
            SET name = $1, parent_id = $2, description = $3, status = $4, updated_at = now()
            WHERE id = $5
            "#,
        )
        .bind(&category.name)
        .bind(category.parent_id)
        .bind(&category.description)
        .bind(category.status.to_db_str())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("categories", id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Category>> {
        let sql = format!("SELECT {} FROM categories WHERE id = $1", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Self::map_row).transpose()?)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE {} ORDER BY name",
            SELECT_COLUMNS,
            like_clause(Placeholder::Postgres, "name", 1, true)
        );
        let rows = sqlx::query(&sql)
            .bind(like_contains(name))
            .fetch_all(&self.pool)
            .await?;
        Self::map_rows(rows)
    }

    async fn find_children(&self, parent_id: i64) -> RepositoryResult<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE parent_id = $1 ORDER BY name",
            SELECT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;
        Self::map_rows(rows)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Category>> {
        let sql = format!("SELECT {} FROM categories ORDER BY name", SELECT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Self::map_rows(rows)
    }
}
