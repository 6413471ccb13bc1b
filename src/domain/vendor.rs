// ==========================================
// 供应商目录系统 - 供应商领域模型
// ==========================================
// 对齐: vendors 表
// ==========================================

use crate::domain::types::RecordStatus;
use serde::{Deserialize, Serialize};

// ==========================================
// Vendor - 供应商
// ==========================================
// 用途: 界面维护 / 导入前置；被 vendor_products 引用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: Option<i64>,              // 主键（未落库时为 None）
    pub name: String,                 // 显示名称（必填）
    pub description: Option<String>,  // 描述
    pub contact_info: Option<String>, // 联系方式（自由文本）
    pub status: RecordStatus,         // 状态
}

impl Vendor {
    /// 创建一个未落库的启用状态供应商
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            contact_info: None,
            status: RecordStatus::Active,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_contact_info(mut self, contact_info: impl Into<String>) -> Self {
        self.contact_info = Some(contact_info.into());
        self
    }
}
