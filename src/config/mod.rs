// ==========================================
// 供应商目录系统 - 配置层
// ==========================================
// 职责: 应用配置（JSON 文件）与导入配置
// 存储: ~/.VendorCatalog/config.json
// ==========================================

pub mod config_manager;
pub mod error;
pub mod import_config;

// 重导出核心配置类型
pub use config_manager::{AppConfig, AppPaths, ConfigManager, DatabaseConfig, UiConfig};
pub use error::{ConfigError, ConfigResult};
pub use import_config::{
    import_source_from_connection, load_field_mapping, parse_field_mapping, parse_headers_json,
    ApiAuth, ApiImportConfig, SavedImportSource, SftpImportConfig,
};
