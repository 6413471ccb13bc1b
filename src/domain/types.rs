// ==========================================
// 供应商目录系统 - 领域类型定义
// ==========================================
// 职责: 记录状态、连接类型、数据库后端等枚举
// 序列化格式: 小写 (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 记录状态 (Record Status)
// ==========================================
// 适用: 供应商 / 分类 / 主商品 / 供应商商品 / 连接
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Active,   // 启用
    Inactive, // 停用
}

impl RecordStatus {
    /// 转换为数据库存储字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Inactive => "inactive",
        }
    }

    /// 从数据库字符串解析（未知值按 active 处理）
    pub fn from_db_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "inactive" => RecordStatus::Inactive,
            _ => RecordStatus::Active,
        }
    }

    /// 从导入源的自由文本解析
    ///
    /// 规则: inactive/false/0/no/n/discontinued/disabled → Inactive，其余 → Active
    pub fn from_import_value(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "inactive" | "false" | "0" | "no" | "n" | "discontinued" | "disabled" => {
                RecordStatus::Inactive
            }
            _ => RecordStatus::Active,
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 连接类型 (Connection Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Sftp,
    Ftp,
    Api,
    Edi,
    Rest,
    Soap,
    Other,
}

impl ConnectionType {
    /// 全部可用连接类型（供界面下拉使用）
    pub const ALL: [ConnectionType; 7] = [
        ConnectionType::Sftp,
        ConnectionType::Ftp,
        ConnectionType::Api,
        ConnectionType::Edi,
        ConnectionType::Rest,
        ConnectionType::Soap,
        ConnectionType::Other,
    ];

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ConnectionType::Sftp => "sftp",
            ConnectionType::Ftp => "ftp",
            ConnectionType::Api => "api",
            ConnectionType::Edi => "edi",
            ConnectionType::Rest => "rest",
            ConnectionType::Soap => "soap",
            ConnectionType::Other => "other",
        }
    }

    /// 解析连接类型，未知值返回 None
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sftp" => Some(ConnectionType::Sftp),
            "ftp" => Some(ConnectionType::Ftp),
            "api" => Some(ConnectionType::Api),
            "edi" => Some(ConnectionType::Edi),
            "rest" => Some(ConnectionType::Rest),
            "soap" => Some(ConnectionType::Soap),
            "other" => Some(ConnectionType::Other),
            _ => None,
        }
    }

    /// 从数据库字符串解析（未知值按 other 处理）
    pub fn from_db_str(s: &str) -> Self {
        Self::parse(s).unwrap_or(ConnectionType::Other)
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 数据库后端 (Database Backend)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Sqlite,     // 内嵌文件数据库
    Postgresql, // 关系型数据库服务器
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseBackend::Sqlite => write!(f, "sqlite"),
            DatabaseBackend::Postgresql => write!(f, "postgresql"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_status_from_import_value() {
        assert_eq!(RecordStatus::from_import_value("Discontinued"), RecordStatus::Inactive);
        assert_eq!(RecordStatus::from_import_value(" false "), RecordStatus::Inactive);
        assert_eq!(RecordStatus::from_import_value("in stock"), RecordStatus::Active);
        assert_eq!(RecordStatus::from_import_value("1"), RecordStatus::Active);
    }

    #[test]
    fn test_connection_type_parse() {
        assert_eq!(ConnectionType::parse("SFTP"), Some(ConnectionType::Sftp));
        assert_eq!(ConnectionType::parse("gopher"), None);
        assert_eq!(ConnectionType::from_db_str("gopher"), ConnectionType::Other);
    }

    #[test]
    fn test_database_backend_serde() {
        let backend: DatabaseBackend = serde_json::from_str("\"postgresql\"").unwrap();
        assert_eq!(backend, DatabaseBackend::Postgresql);
    }
}
