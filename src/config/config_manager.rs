// ==========================================
// 供应商目录系统 - 配置管理器
// ==========================================
// 职责: 配置加载、点路径查询、覆写并持久化
// 存储: ~/.VendorCatalog/config.json
// 规则: 文件内容深度合并到内置默认值之上；文件缺失时写出默认值
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::DatabaseBackend;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::postgres::PgConnectOptions;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 应用目录名（位于用户主目录下）
pub const APP_DIR_NAME: &str = ".VendorCatalog";

// ==========================================
// AppPaths - 应用文件位置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub root: PathBuf,
    pub database: PathBuf,
    pub logs: PathBuf,
    pub config: PathBuf,
}

impl AppPaths {
    /// 基于用户主目录
    pub fn from_home() -> ConfigResult<Self> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirUnavailable)?;
        Ok(Self::under(home.join(APP_DIR_NAME)))
    }

    /// 基于指定根目录（测试 / 便携模式）
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            database: root.join("database.db"),
            logs: root.join("logs"),
            config: root.join("config.json"),
            root,
        }
    }

    /// 创建根目录与日志目录
    pub fn ensure_dirs(&self) -> ConfigResult<()> {
        fs::create_dir_all(&self.root)?;
        fs::create_dir_all(&self.logs)?;
        Ok(())
    }
}

// ==========================================
// AppConfig - 类型化配置视图
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub theme: String,
    pub debug_mode: bool,
    pub auto_backup: bool,
    pub backup_interval_days: u32,
    pub max_backups: u32,
    pub ui: UiConfig,
    pub database: DatabaseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            debug_mode: false,
            auto_backup: true,
            backup_interval_days: 7,
            max_backups: 5,
            ui: UiConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub font_size: u32,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            font_size: 10,
            window_width: 1024,
            window_height: 768,
        }
    }
}

/// 数据库配置（type 决定存储实现）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    #[serde(rename = "type")]
    pub db_type: DatabaseBackend,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// SQLite 文件路径（为空时使用 AppPaths::database）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseBackend::Sqlite,
            host: "localhost".to_string(),
            port: 5432,
            name: "vendor_catalog".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            path: None,
        }
    }
}

impl DatabaseConfig {
    /// PostgreSQL 连接参数（各字段分别传入驱动，密码中的 @ / # : 无需转义）
    pub fn pg_connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name);
        if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    path: PathBuf,
    value: Value,
}

impl ConfigManager {
    /// 加载配置文件
    ///
    /// # 参数
    /// - path: 配置文件路径
    ///
    /// # 说明
    /// - 文件缺失: 写出默认配置
    /// - 文件损坏: 记录告警并使用默认配置（不覆盖原文件）
    /// - 值类型不符: 记录告警，仅该键恢复默认值
    pub fn load(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let path = path.into();
        let defaults = serde_json::to_value(AppConfig::default())?;

        if !path.exists() {
            let manager = Self {
                path,
                value: defaults,
            };
            manager.save()?;
            info!(path = %manager.path.display(), "配置文件不存在，已写出默认配置");
            return Ok(manager);
        }

        let text = fs::read_to_string(&path)?;
        let value = match serde_json::from_str::<Value>(&text) {
            Ok(user) => {
                let mut merged = defaults.clone();
                deep_merge(&mut merged, user);
                if serde_json::from_value::<AppConfig>(merged.clone()).is_ok() {
                    merged
                } else {
                    let (repaired, rejected) = keep_valid_leaves(&merged, defaults);
                    warn!(
                        path = %path.display(),
                        keys = ?rejected,
                        "配置项类型不符，已恢复为默认值"
                    );
                    repaired
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "配置文件解析失败，使用默认配置");
                defaults
            }
        };

        debug!(path = %path.display(), "配置加载完成");
        Ok(Self { path, value })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 当前配置的 JSON 视图
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// 类型化配置
    pub fn app_config(&self) -> ConfigResult<AppConfig> {
        Ok(serde_json::from_value(self.value.clone())?)
    }

    /// 点路径读取（如 `database.port`）
    pub fn get_setting(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.value, |current, segment| current.get(segment))
    }

    pub fn get_setting_or(&self, key: &str, default: Value) -> Value {
        self.get_setting(key).cloned().unwrap_or(default)
    }

    /// 点路径写入并持久化
    ///
    /// # 说明
    /// - 中间层缺失或不是对象时以空对象替换
    /// - 写入后无法构成 AppConfig 时拒绝（InvalidValue），内存与文件均不变
    pub fn set_setting(&mut self, key: &str, value: Value) -> ConfigResult<()> {
        let segments: Vec<&str> = key.split('.').collect();
        if key.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "配置键不能为空".to_string(),
            });
        }

        let mut candidate = self.value.clone();
        set_path(&mut candidate, &segments, value);
        if let Err(e) = serde_json::from_value::<AppConfig>(candidate.clone()) {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            });
        }
        self.value = candidate;

        self.save()?;
        info!(key = %key, "配置已更新");
        Ok(())
    }

    /// 写回配置文件
    pub fn save(&self) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&self.value)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

/// 按路径写入，中间层缺失或不是对象时以空对象替换；空路径替换整个值
fn set_path<S: AsRef<str>>(root: &mut Value, segments: &[S], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for segment in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        current = map
            .entry(segment.as_ref().to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(last.as_ref().to_string(), value);
    }
}

/// 叶子值（非对象或空对象）及其路径
fn collect_leaves(value: &Value, prefix: &mut Vec<String>, out: &mut Vec<(Vec<String>, Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                prefix.push(key.clone());
                collect_leaves(child, prefix, out);
                prefix.pop();
            }
        }
        leaf => out.push((prefix.clone(), leaf.clone())),
    }
}

/// 从默认值出发逐个叠加叶子，使 AppConfig 无法反序列化的叶子保持默认
///
/// # 返回
/// - (修复后的配置, 被拒绝的点路径)
fn keep_valid_leaves(merged: &Value, defaults: Value) -> (Value, Vec<String>) {
    let mut leaves = Vec::new();
    collect_leaves(merged, &mut Vec::new(), &mut leaves);

    let mut accepted = defaults;
    let mut rejected = Vec::new();
    for (path, leaf) in leaves {
        let mut candidate = accepted.clone();
        set_path(&mut candidate, &path, leaf);
        if serde_json::from_value::<AppConfig>(candidate.clone()).is_ok() {
            accepted = candidate;
        } else {
            rejected.push(path.join("."));
        }
    }
    (accepted, rejected)
}

/// 深度合并：对象按键递归，其余类型直接覆盖
fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deep_merge_keeps_nested_defaults() {
        let mut base = json!({"ui": {"font_size": 10, "window_width": 1024}, "theme": "default"});
        deep_merge(&mut base, json!({"ui": {"font_size": 14}}));
        assert_eq!(base["ui"]["font_size"], json!(14));
        assert_eq!(base["ui"]["window_width"], json!(1024));
        assert_eq!(base["theme"], json!("default"));
    }

    #[test]
    fn test_pg_connect_options_keep_special_characters() {
        let mut db = DatabaseConfig::default();
        db.host = "db.internal".to_string();
        db.port = 6543;
        db.user = "catalog@corp".to_string();
        db.password = "p@ss/w#rd:1".to_string();

        let options = db.pg_connect_options();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "catalog@corp");
        assert_eq!(options.get_database(), Some("vendor_catalog"));
    }

    #[test]
    fn test_keep_valid_leaves_restores_only_bad_keys() {
        let defaults = serde_json::to_value(AppConfig::default()).unwrap();
        let mut merged = defaults.clone();
        deep_merge(
            &mut merged,
            json!({"theme": "dark", "ui": {"font_size": "big", "window_width": 1280}, "extra": [1]}),
        );

        let (repaired, rejected) = keep_valid_leaves(&merged, defaults);
        assert_eq!(rejected, vec!["ui.font_size".to_string()]);
        assert_eq!(repaired["ui"]["font_size"], json!(10));
        assert_eq!(repaired["ui"]["window_width"], json!(1280));
        assert_eq!(repaired["theme"], json!("dark"));
        assert_eq!(repaired["extra"], json!([1]));
    }

    #[test]
    fn test_app_paths_layout() {
        let paths = AppPaths::under("/tmp/vc");
        assert_eq!(paths.config, PathBuf::from("/tmp/vc/config.json"));
        assert_eq!(paths.database, PathBuf::from("/tmp/vc/database.db"));
        assert_eq!(paths.logs, PathBuf::from("/tmp/vc/logs"));
    }
}
