// ==========================================
// 供应商目录系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite / PostgreSQL
// 系统定位: 供应商商品目录维护 + 多来源商品数据导入
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    Category, ConnectionType, FieldMapping, ImportOutcome, MasterProduct, RecordStatus, Vendor,
    VendorConnection, VendorProduct,
};

// 存储
pub use repository::{open_catalog_store, CatalogStore, SqliteCatalogStore};

// 导入
pub use importer::{CatalogImporter, ImportError};

// API
pub use api::{ConnectionApi, ImportApi, ProductApi, VendorApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "供应商目录系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
