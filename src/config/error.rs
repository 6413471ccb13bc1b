// ==========================================
// 供应商目录系统 - 配置层错误类型
// ==========================================
// 说明: 配置错误在导入开始之前暴露
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("无法定位用户主目录")]
    HomeDirUnavailable,

    #[error("配置文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置 JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("端口无效: {0}")]
    InvalidPort(String),

    #[error("请求头 JSON 无效: {0}")]
    InvalidHeaders(String),

    #[error("字段映射 JSON 无效: {0}")]
    InvalidMapping(String),

    #[error("不支持的认证方式: {0}")]
    UnknownAuthType(String),

    #[error("缺少必填配置项: {0}")]
    MissingField(String),

    #[error("配置项无效 (key={key}): {message}")]
    InvalidValue { key: String, message: String },

    #[error("连接类型不支持导入: {0}")]
    UnsupportedConnectionType(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
