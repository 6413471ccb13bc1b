// ==========================================
// 供应商目录系统 - 配置管理 API
// ==========================================
// 职责: 配置查询、更新（点分路径）
// 存储: ~/.VendorCatalog/config.json（写入即落盘）
// ==========================================

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{AppConfig, ConfigManager};

/// 配置管理API
pub struct ConfigApi {
    config_manager: Arc<Mutex<ConfigManager>>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<Mutex<ConfigManager>>) -> Self {
        Self { config_manager }
    }

    fn manager(&self) -> ApiResult<MutexGuard<'_, ConfigManager>> {
        self.config_manager
            .lock()
            .map_err(|e| ApiError::InternalError(format!("配置锁获取失败: {}", e)))
    }

    /// 查询单个配置
    ///
    /// # 参数
    /// - key: 点分路径（如 "database.type"）
    ///
    /// # 返回
    /// - Ok(Value): 配置值
    /// - Err(NotFound): 路径不存在
    pub fn get_setting(&self, key: &str) -> ApiResult<Value> {
        if key.trim().is_empty() {
            return Err(ApiError::InvalidInput("配置键不能为空".to_string()));
        }
        self.manager()?
            .get_setting(key)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("配置项 {} 不存在", key)))
    }

    /// 更新单个配置并落盘
    ///
    /// # 参数
    /// - raw_value: 能解析为 JSON 时按 JSON 写入，否则按字符串写入
    pub fn set_setting(&self, key: &str, raw_value: &str) -> ApiResult<Value> {
        if key.trim().is_empty() {
            return Err(ApiError::InvalidInput("配置键不能为空".to_string()));
        }
        let value = serde_json::from_str::<Value>(raw_value)
            .unwrap_or_else(|_| Value::String(raw_value.to_string()));

        self.manager()?.set_setting(key, value.clone())?;
        tracing::info!(key, value = %value, "配置已更新");
        Ok(value)
    }

    /// 全部配置（合并默认值后的 JSON）
    pub fn all_settings(&self) -> ApiResult<Value> {
        Ok(self.manager()?.as_value().clone())
    }

    pub fn app_config(&self) -> ApiResult<AppConfig> {
        Ok(self.manager()?.app_config()?)
    }
}
