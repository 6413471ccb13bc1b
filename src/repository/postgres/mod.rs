// ==========================================
// 供应商目录系统 - PostgreSQL 存储实现
// ==========================================
// 工具: sqlx（PgPool，运行时参数化查询）
// 差异: BIGSERIAL 主键 / JSONB 属性袋 / TIMESTAMPTZ
// ==========================================

mod category_repo;
mod connection_repo;
mod master_product_repo;
mod vendor_product_repo;
mod vendor_repo;

pub use category_repo::PgCategoryRepository;
pub use connection_repo::PgConnectionRepository;
pub use master_product_repo::PgMasterProductRepository;
pub use vendor_product_repo::PgVendorProductRepository;
pub use vendor_repo::PgVendorRepository;

use crate::db::create_pg_pool;
use crate::domain::{DatabaseBackend, PropertyBag};
use crate::repository::catalog_store::{
    CatalogStore, CategoryRepository, ConnectionRepository, MasterProductRepository,
    VendorProductRepository, VendorRepository,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use sqlx::postgres::PgConnectOptions;
use sqlx::PgPool;
use tracing::info;

/// JSONB → 属性袋（非对象视为空）
pub(crate) fn bag_from_json(value: Option<serde_json::Value>) -> PropertyBag {
    match value {
        Some(serde_json::Value::Object(map)) => map,
        _ => PropertyBag::new(),
    }
}

pub(crate) fn bag_to_json(bag: &PropertyBag) -> serde_json::Value {
    serde_json::Value::Object(bag.clone())
}

pub(crate) fn require_id(id: Option<i64>, entity: &str) -> RepositoryResult<i64> {
    id.ok_or_else(|| RepositoryError::ValidationError(format!("{} 缺少主键，无法更新", entity)))
}

/// 依次执行建表语句（预处理协议每次只允许一条语句）
pub(crate) async fn execute_all(pool: &PgPool, statements: &[&str]) -> RepositoryResult<()> {
    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

// ==========================================
// PostgresCatalogStore
// ==========================================
pub struct PostgresCatalogStore {
    pool: PgPool,
    vendors: PgVendorRepository,
    categories: PgCategoryRepository,
    master_products: PgMasterProductRepository,
    vendor_products: PgVendorProductRepository,
    connections: PgConnectionRepository,
}

impl PostgresCatalogStore {
    /// 连接数据库
    ///
    /// # 参数
    /// - options: 主机 / 端口 / 用户 / 密码 / 库名
    pub async fn connect(options: PgConnectOptions) -> RepositoryResult<Self> {
        let pool = create_pg_pool(options).await?;
        info!("PostgreSQL 目录存储已连接");
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            vendors: PgVendorRepository::new(pool.clone()),
            categories: PgCategoryRepository::new(pool.clone()),
            master_products: PgMasterProductRepository::new(pool.clone()),
            vendor_products: PgVendorProductRepository::new(pool.clone()),
            connections: PgConnectionRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl CatalogStore for PostgresCatalogStore {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Postgresql
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
