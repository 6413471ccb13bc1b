// ==========================================
// 供应商目录系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 边界: 读取器失败在 CatalogImporter 处转换为 (0, [错误文本])
// ==========================================

use crate::config::ConfigError;
use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv/.xlsx/.xls/.xlsm/.ods/.json/.xml）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("数据格式错误: {0}")]
    MalformedPayload(String),

    // ===== 远程源错误 =====
    #[error("认证失败: {0}")]
    AuthenticationFailed(String),

    #[error("请求失败: {0}")]
    TransportError(String),

    #[error("远程服务器错误: {0}")]
    RemoteError(String),

    #[error("没有匹配的文件 (目录 {directory}, 模式 {pattern})")]
    NoMatchingFiles { directory: String, pattern: String },

    #[error("SFTP 支持未启用（需要 sftp feature）")]
    SftpUnavailable,

    // ===== 记录级错误 =====
    #[error("缺少必填字段 {field}")]
    MissingRequiredField { field: String },

    #[error("类型转换失败 (字段 {field}): {message}")]
    TypeConversionError { field: String, message: String },

    // ===== 前置条件 =====
    #[error("供应商不存在: id={0}")]
    VendorNotFound(i64),

    // ===== 下层错误 =====
    #[error("数据库错误: {0}")]
    Repository(#[from] RepositoryError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    // ===== 后台任务 =====
    #[error("导入任务失败: {0}")]
    TaskFailed(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::MalformedPayload(format!("JSON 解析失败: {}", err))
    }
}

impl From<roxmltree::Error> for ImportError {
    fn from(err: roxmltree::Error) -> Self {
        ImportError::MalformedPayload(format!("XML 解析失败: {}", err))
    }
}

impl From<reqwest::Error> for ImportError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if status.as_u16() == 401 || status.as_u16() == 403 => {
                ImportError::AuthenticationFailed(err.to_string())
            }
            _ if err.is_decode() => ImportError::MalformedPayload(err.to_string()),
            _ => ImportError::TransportError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
