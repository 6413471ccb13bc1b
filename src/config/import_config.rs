// ==========================================
// 供应商目录系统 - 导入配置
// ==========================================
// 职责: API / SFTP 导入配置、字段映射加载、已保存连接 → 导入配置
// 红线: 配置错误在导入开始之前返回 ConfigError
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::{ConnectionConfig, ConnectionType, FieldMapping, VendorConnection};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// SFTP 默认端口
pub const DEFAULT_SFTP_PORT: u16 = 22;

// ==========================================
// ApiAuth - API 认证方式
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "auth_type", rename_all = "lowercase")]
pub enum ApiAuth {
    #[default]
    None,
    Basic { username: String, password: String },
    Bearer { token: String },
}

impl ApiAuth {
    /// 由 auth_type + auth_params 构造
    ///
    /// # 参数
    /// - auth_type: none / basic / bearer（大小写不敏感，空视为 none）
    /// - params: username / password / token
    pub fn from_parts(auth_type: &str, params: &BTreeMap<String, String>) -> ConfigResult<Self> {
        let param = |k: &str| params.get(k).cloned().unwrap_or_default();
        match auth_type.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(ApiAuth::None),
            "basic" => Ok(ApiAuth::Basic {
                username: param("username"),
                password: param("password"),
            }),
            "bearer" => Ok(ApiAuth::Bearer {
                token: param("token"),
            }),
            other => Err(ConfigError::UnknownAuthType(other.to_string())),
        }
    }
}

// ==========================================
// ApiImportConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiImportConfig {
    pub url: String,
    pub auth: ApiAuth,
    pub headers: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>, // 仅首个请求携带
    pub items_path: String,               // 点分路径，空表示响应体本身
    pub next_page_path: Option<String>,   // Some 表示启用分页
}

impl ApiImportConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth: ApiAuth::None,
            headers: BTreeMap::new(),
            params: BTreeMap::new(),
            items_path: String::new(),
            next_page_path: None,
        }
    }

    pub fn with_auth(mut self, auth: ApiAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_items_path(mut self, path: impl Into<String>) -> Self {
        self.items_path = path.into();
        self
    }

    pub fn with_pagination(mut self, next_page_path: impl Into<String>) -> Self {
        self.next_page_path = Some(next_page_path.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// 从 JSON 对象解析（已保存连接 / 命令行参数共用）
    ///
    /// 键: url, auth_type, auth_params, headers（对象或 JSON 文本）, params,
    ///     items_path, paginated, next_page_path
    pub fn from_config(config: &ConnectionConfig) -> ConfigResult<Self> {
        let url = string_field(config, "url")
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingField("url".to_string()))?;

        let auth_params = match config.get("auth_params") {
            Some(v) => string_map(v, "auth_params")?,
            None => BTreeMap::new(),
        };
        let auth = ApiAuth::from_parts(
            &string_field(config, "auth_type").unwrap_or_default(),
            &auth_params,
        )?;

        let headers = match config.get("headers") {
            Some(Value::String(text)) => parse_headers_json(text)?,
            Some(Value::Null) | None => BTreeMap::new(),
            Some(v) => string_map(v, "headers")
                .map_err(|e| ConfigError::InvalidHeaders(e.to_string()))?,
        };

        let params = match config.get("params") {
            Some(v) => string_map(v, "params")?,
            None => BTreeMap::new(),
        };

        let paginated = config
            .get("paginated")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let next_page_path = if paginated {
            Some(string_field(config, "next_page_path").unwrap_or_default())
        } else {
            None
        };

        Ok(Self {
            url,
            auth,
            headers,
            params,
            items_path: string_field(config, "items_path").unwrap_or_default(),
            next_page_path,
        })
    }
}

/// 解析请求头 JSON 文本（空白文本视为无请求头）
pub fn parse_headers_json(text: &str) -> ConfigResult<BTreeMap<String, String>> {
    if text.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let value: Value =
        serde_json::from_str(text).map_err(|e| ConfigError::InvalidHeaders(e.to_string()))?;
    string_map(&value, "headers").map_err(|e| ConfigError::InvalidHeaders(e.to_string()))
}

// ==========================================
// SftpImportConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SftpImportConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub directory: String,
    pub file_pattern: String,
}

impl SftpImportConfig {
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_SFTP_PORT,
            username: username.into(),
            password: String::new(),
            directory: "/".to_string(),
            file_pattern: "*".to_string(),
        }
    }

    /// 端口文本解析（空白 → 22）
    pub fn parse_port(text: &str) -> ConfigResult<u16> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(DEFAULT_SFTP_PORT);
        }
        match trimmed.parse::<u16>() {
            Ok(0) | Err(_) => Err(ConfigError::InvalidPort(trimmed.to_string())),
            Ok(port) => Ok(port),
        }
    }

    /// 从 JSON 对象解析
    ///
    /// 键: host, port（数字或文本）, username, password, directory, file_pattern
    pub fn from_config(config: &ConnectionConfig) -> ConfigResult<Self> {
        let host = string_field(config, "host")
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingField("host".to_string()))?;

        let port = match config.get("port") {
            None | Some(Value::Null) => DEFAULT_SFTP_PORT,
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|p| u16::try_from(p).ok())
                .filter(|p| *p != 0)
                .ok_or_else(|| ConfigError::InvalidPort(n.to_string()))?,
            Some(Value::String(s)) => Self::parse_port(s)?,
            Some(other) => return Err(ConfigError::InvalidPort(other.to_string())),
        };

        Ok(Self {
            host,
            port,
            username: string_field(config, "username").unwrap_or_default(),
            password: string_field(config, "password").unwrap_or_default(),
            directory: string_field(config, "directory")
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "/".to_string()),
            file_pattern: string_field(config, "file_pattern")
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "*".to_string()),
        })
    }
}

// ==========================================
// 已保存连接 → 导入配置
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum SavedImportSource {
    Api(ApiImportConfig),
    Sftp(SftpImportConfig),
}

/// 将已保存的连接转换为导入配置
///
/// # 说明
/// - api / rest → ApiImportConfig
/// - sftp → SftpImportConfig
/// - 其他类型仅保存，不支持直接导入
pub fn import_source_from_connection(conn: &VendorConnection) -> ConfigResult<SavedImportSource> {
    match conn.conn_type {
        ConnectionType::Api | ConnectionType::Rest => Ok(SavedImportSource::Api(
            ApiImportConfig::from_config(&conn.config)?,
        )),
        ConnectionType::Sftp => Ok(SavedImportSource::Sftp(SftpImportConfig::from_config(
            &conn.config,
        )?)),
        other => Err(ConfigError::UnsupportedConnectionType(other.to_string())),
    }
}

// ==========================================
// 字段映射加载
// ==========================================

/// 解析字段映射 JSON `{ "目标字段": ["别名", ...] }`
pub fn parse_field_mapping(text: &str) -> ConfigResult<FieldMapping> {
    serde_json::from_str(text).map_err(|e| ConfigError::InvalidMapping(e.to_string()))
}

/// 从文件加载字段映射
pub fn load_field_mapping(path: &Path) -> ConfigResult<FieldMapping> {
    let text = fs::read_to_string(path)?;
    parse_field_mapping(&text)
}

// ===== 内部工具 =====

fn string_field(config: &ConnectionConfig, key: &str) -> Option<String> {
    config.get(key).and_then(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_map(value: &Value, key: &str) -> ConfigResult<BTreeMap<String, String>> {
    let object = value.as_object().ok_or_else(|| ConfigError::InvalidValue {
        key: key.to_string(),
        message: "应为 JSON 对象".to_string(),
    })?;
    Ok(object
        .iter()
        .map(|(k, v)| (k.clone(), scalar_text(v).unwrap_or_else(|| v.to_string())))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> ConnectionConfig {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(SftpImportConfig::parse_port("").unwrap(), 22);
        assert_eq!(SftpImportConfig::parse_port(" 2222 ").unwrap(), 2222);
        assert!(matches!(
            SftpImportConfig::parse_port("ssh"),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(SftpImportConfig::parse_port("70000").is_err());
    }

    #[test]
    fn test_headers_json() {
        let headers = parse_headers_json(r#"{"X-Key": "abc", "X-Num": 3}"#).unwrap();
        assert_eq!(headers.get("X-Key").map(String::as_str), Some("abc"));
        assert_eq!(headers.get("X-Num").map(String::as_str), Some("3"));
        assert!(parse_headers_json("   ").unwrap().is_empty());
        assert!(matches!(
            parse_headers_json("{not json"),
            Err(ConfigError::InvalidHeaders(_))
        ));
        assert!(matches!(
            parse_headers_json("[1, 2]"),
            Err(ConfigError::InvalidHeaders(_))
        ));
    }

    #[test]
    fn test_api_config_from_json() {
        let config = object(json!({
            "url": "https://feed.example.com/products",
            "auth_type": "bearer",
            "auth_params": {"token": "t0k"},
            "headers": "{\"Accept\": \"application/json\"}",
            "params": {"page_size": 50},
            "items_path": "data.items",
            "paginated": true,
            "next_page_path": "links.next"
        }));

        let api = ApiImportConfig::from_config(&config).unwrap();

        assert_eq!(api.auth, ApiAuth::Bearer { token: "t0k".to_string() });
        assert_eq!(api.headers.get("Accept").map(String::as_str), Some("application/json"));
        assert_eq!(api.params.get("page_size").map(String::as_str), Some("50"));
        assert_eq!(api.items_path, "data.items");
        assert_eq!(api.next_page_path.as_deref(), Some("links.next"));
    }

    #[test]
    fn test_api_config_unknown_auth_type() {
        let config = object(json!({"url": "http://x", "auth_type": "oauth2"}));
        assert!(matches!(
            ApiImportConfig::from_config(&config),
            Err(ConfigError::UnknownAuthType(_))
        ));
    }

    #[test]
    fn test_saved_connection_to_sftp_source() {
        let mut conn = VendorConnection::new(1, "nightly", ConnectionType::Sftp);
        conn.config = object(json!({"host": "sftp.example.com", "port": "2200", "username": "u"}));

        match import_source_from_connection(&conn).unwrap() {
            SavedImportSource::Sftp(sftp) => {
                assert_eq!(sftp.port, 2200);
                assert_eq!(sftp.directory, "/");
                assert_eq!(sftp.file_pattern, "*");
            }
            other => panic!("unexpected source: {:?}", other),
        }

        conn.conn_type = ConnectionType::Soap;
        assert!(matches!(
            import_source_from_connection(&conn),
            Err(ConfigError::UnsupportedConnectionType(_))
        ));
    }

    #[test]
    fn test_parse_field_mapping_rejects_non_list() {
        assert!(parse_field_mapping(r#"{"sku": ["item"]}"#).is_ok());
        assert!(matches!(
            parse_field_mapping(r#"{"sku": "item"}"#),
            Err(ConfigError::InvalidMapping(_))
        ));
    }
}
