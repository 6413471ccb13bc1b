// ==========================================
// 供应商目录系统 - SQLite 存储实现
// ==========================================
// 工具: rusqlite（共享 Arc<Mutex<Connection>>）
// 约束: 所有查询使用参数化
// ==========================================

mod category_repo;
mod connection_repo;
mod master_product_repo;
mod vendor_product_repo;
mod vendor_repo;

pub use category_repo::SqliteCategoryRepository;
pub use connection_repo::SqliteConnectionRepository;
pub use master_product_repo::SqliteMasterProductRepository;
pub use vendor_product_repo::SqliteVendorProductRepository;
pub use vendor_repo::SqliteVendorRepository;

use crate::db::open_sqlite_connection;
use crate::domain::{DatabaseBackend, PropertyBag};
use crate::repository::catalog_store::{
    CatalogStore, CategoryRepository, ConnectionRepository, MasterProductRepository,
    VendorProductRepository, VendorRepository,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// 共享连接
pub type SharedConnection = Arc<Mutex<Connection>>;

/// 获取数据库连接
pub(crate) fn lock(conn: &SharedConnection) -> RepositoryResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| RepositoryError::LockError(e.to_string()))
}

/// 属性袋 → JSON 文本
pub(crate) fn bag_to_text(bag: &PropertyBag) -> RepositoryResult<String> {
    Ok(serde_json::to_string(bag)?)
}

/// JSON 文本 → 属性袋（空值或非法 JSON 视为空对象）
pub(crate) fn bag_from_text(text: Option<String>) -> PropertyBag {
    text.and_then(|t| serde_json::from_str::<PropertyBag>(&t).ok())
        .unwrap_or_default()
}

pub(crate) fn require_id(id: Option<i64>, entity: &str) -> RepositoryResult<i64> {
    id.ok_or_else(|| RepositoryError::ValidationError(format!("{} 缺少主键，无法更新", entity)))
}

// ==========================================
// SqliteCatalogStore
// ==========================================
pub struct SqliteCatalogStore {
    conn: SharedConnection,
    vendors: SqliteVendorRepository,
    categories: SqliteCategoryRepository,
    master_products: SqliteMasterProductRepository,
    vendor_products: SqliteVendorProductRepository,
    connections: SqliteConnectionRepository,
}

impl SqliteCatalogStore {
    /// 打开（或创建）数据库文件
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        info!(db_path = %db_path, "SQLite 目录存储已打开");
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 内存数据库（测试 / 临时导入）
    pub fn open_in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        crate::db::configure_sqlite_connection(&conn)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建
    pub fn from_connection(conn: SharedConnection) -> Self {
        Self {
            vendors: SqliteVendorRepository::from_connection(conn.clone()),
            categories: SqliteCategoryRepository::from_connection(conn.clone()),
            master_products: SqliteMasterProductRepository::from_connection(conn.clone()),
            vendor_products: SqliteVendorProductRepository::from_connection(conn.clone()),
            connections: SqliteConnectionRepository::from_connection(conn.clone()),
            conn,
        }
    }

    pub fn connection(&self) -> SharedConnection {
        self.conn.clone()
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Sqlite
    }

    fn vendors(&self) -> &dyn VendorRepository {
        &self.vendors
    }

    fn categories(&self) -> &dyn CategoryRepository {
        &self.categories
    }

    fn master_products(&self) -> &dyn MasterProductRepository {
        &self.master_products
    }

    fn vendor_products(&self) -> &dyn VendorProductRepository {
        &self.vendor_products
    }

    fn connections(&self) -> &dyn ConnectionRepository {
        &self.connections
    }
}
