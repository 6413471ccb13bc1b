// ==========================================
// 供应商目录系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行调用
// ==========================================

pub mod config_api;
pub mod connection_api;
pub mod error;
pub mod import_api;
pub mod product_api;
pub mod vendor_api;

// 重导出核心类型
pub use config_api::ConfigApi;
pub use connection_api::ConnectionApi;
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportApiResponse};
pub use product_api::{MasterProductKey, ProductApi, VendorCatalogSummary};
pub use vendor_api::VendorApi;
