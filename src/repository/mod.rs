// ==========================================
// 供应商目录系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod catalog_store;
pub mod error;
pub mod factory;
pub mod postgres;
pub mod sql_builder;
pub mod sqlite;

// 重导出核心仓储
pub use catalog_store::{
    CatalogStore, CategoryRepository, ConnectionRepository, MasterProductRepository,
    VendorProductRepository, VendorRepository,
};
pub use error::{RepositoryError, RepositoryResult};
pub use factory::open_catalog_store;
pub use postgres::PostgresCatalogStore;
pub use sqlite::SqliteCatalogStore;
