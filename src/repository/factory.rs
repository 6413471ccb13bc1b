// ==========================================
// 供应商目录系统 - 存储工厂
// ==========================================
// 职责: 按 DatabaseConfig 选择并打开存储实现，随后建表
// ==========================================

use crate::config::DatabaseConfig;
use crate::domain::DatabaseBackend;
use crate::repository::catalog_store::CatalogStore;
use crate::repository::error::RepositoryResult;
use crate::repository::postgres::PostgresCatalogStore;
use crate::repository::sqlite::SqliteCatalogStore;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// 打开目录存储并初始化表结构
///
/// # 参数
/// - config: 数据库配置
/// - default_sqlite_path: 配置未指定 path 时使用的 SQLite 文件
///
/// # 返回
/// - Ok(Arc<dyn CatalogStore>): 已建表的存储
pub async fn open_catalog_store(
    config: &DatabaseConfig,
    default_sqlite_path: &Path,
) -> RepositoryResult<Arc<dyn CatalogStore>> {
    let store: Arc<dyn CatalogStore> = match config.db_type {
        DatabaseBackend::Sqlite => {
            let path = config
                .path
                .clone()
                .unwrap_or_else(|| default_sqlite_path.to_string_lossy().to_string());
            Arc::new(SqliteCatalogStore::open(&path)?)
        }
        DatabaseBackend::Postgresql => {
            Arc::new(PostgresCatalogStore::connect(config.pg_connect_options()).await?)
        }
    };

    store.init_schema().await?;
    info!(backend = %store.backend(), "目录存储初始化完成");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_sqlite_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("catalog.db");
        let config = DatabaseConfig::default();

        let store = open_catalog_store(&config, &db_path).await.unwrap();

        assert_eq!(store.backend(), DatabaseBackend::Sqlite);
        assert!(db_path.exists());
        assert!(store.vendors().find_all().await.unwrap().is_empty());
    }
}
