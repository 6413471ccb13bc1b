// ==========================================
// 供应商目录系统 - 应用层
// ==========================================
// 职责: 组装配置、存储与 API，供命令行入口使用
// ==========================================

pub mod state;

// 重导出
pub use state::AppState;
