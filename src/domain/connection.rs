// ==========================================
// 供应商目录系统 - 供应商连接配置
// ==========================================
// 对齐: connections 表
// 说明: 仅保存配置（SFTP/API/EDI 等），不会被自动执行
// ==========================================

use crate::domain::types::{ConnectionType, RecordStatus};
use serde::{Deserialize, Serialize};

/// 连接参数（JSON 对象）
pub type ConnectionConfig = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorConnection {
    pub id: Option<i64>,
    pub vendor_id: i64,
    pub name: String,
    pub conn_type: ConnectionType,
    pub config: ConnectionConfig,
    pub status: RecordStatus,
}

impl VendorConnection {
    pub fn new(vendor_id: i64, name: impl Into<String>, conn_type: ConnectionType) -> Self {
        Self {
            id: None,
            vendor_id,
            name: name.into(),
            conn_type,
            config: ConnectionConfig::new(),
            status: RecordStatus::Active,
        }
    }

    /// 按键合并新配置（新值覆盖旧值）
    pub fn merge_config(&mut self, patch: ConnectionConfig) {
        for (key, value) in patch {
            self.config.insert(key, value);
        }
    }
}
