// ==========================================
// 供应商目录系统 - 导入领域模型
// ==========================================
// 职责: 原始记录 / 规范记录 / 字段映射 / 导入结果
// 流程: 源读取器 → RawRecord → 字段映射 → CanonicalRecord → upsert
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 原始记录（源字段名 → 标量文本）
pub type RawRecord = BTreeMap<String, String>;

// ==========================================
// FieldMapping - 字段映射配置
// ==========================================
// 格式: { "目标字段": ["候选源字段1", "候选源字段2", ...] }
// 规则: 候选字段按顺序尝试，第一个非空值胜出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: BTreeMap<String, Vec<String>>,
}

impl FieldMapping {
    pub fn new(entries: BTreeMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    /// 遍历 (目标字段, 候选源字段列表)
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.entries.iter()
    }

    /// 源字段是否出现在任一候选列表中
    pub fn mentions(&self, source_field: &str) -> bool {
        self.entries
            .values()
            .any(|aliases| aliases.iter().any(|a| a == source_field))
    }

    pub fn aliases(&self, target_field: &str) -> Option<&[String]> {
        self.entries.get(target_field).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FieldMapping {
    /// 默认映射（未提供映射时使用）
    fn default() -> Self {
        let table: [(&str, &[&str]); 10] = [
            ("sku", &["sku", "product_id", "item_number", "part_number", "id"]),
            ("name", &["name", "product_name", "title", "description"]),
            ("description", &["description", "long_description", "details"]),
            ("price", &["price", "cost", "wholesale_price", "msrp"]),
            ("category", &["category", "product_type", "type"]),
            ("brand", &["brand", "manufacturer"]),
            ("upc", &["upc", "gtin", "ean", "barcode"]),
            ("weight", &["weight"]),
            ("dimensions", &["dimensions", "size"]),
            ("status", &["status", "availability", "is_active"]),
        ];

        let entries = table
            .iter()
            .map(|(target, aliases)| {
                (
                    target.to_string(),
                    aliases.iter().map(|a| a.to_string()).collect(),
                )
            })
            .collect();

        Self { entries }
    }
}

// ==========================================
// CanonicalRecord - 规范记录（字段映射之后）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub row_number: usize,                  // 批内序号（从 1 开始）
    pub fields: BTreeMap<String, String>,   // 已识别的目标字段
    pub properties: BTreeMap<String, String>, // 映射未提及的源字段（原样保留）
    pub raw: RawRecord,                     // 原始记录（错误回显用）
}

impl CanonicalRecord {
    /// 读取目标字段（空白视为缺失）
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// 原始记录的 JSON 文本
    pub fn raw_json(&self) -> String {
        serde_json::to_string(&self.raw).unwrap_or_else(|_| format!("{:?}", self.raw))
    }
}

// ==========================================
// ImportOutcome - 导入结果 (成功条数, 错误列表)
// ==========================================
// 红线: 单条记录失败不中断整批
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub imported: usize,
    pub errors: Vec<String>,
}

impl ImportOutcome {
    /// 读取器/前置条件失败：0 条 + 单条错误
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            imported: 0,
            errors: vec![message.into()],
        }
    }

    /// 累加另一批结果
    pub fn absorb(&mut self, other: ImportOutcome) {
        self.imported += other.imported;
        self.errors.extend(other.errors);
    }

    pub fn as_tuple(&self) -> (usize, Vec<String>) {
        (self.imported, self.errors.clone())
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

// ==========================================
// ImportReport - 后台导入任务报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub task_id: String,
    pub source: String, // 导入来源描述（file/api/sftp/edi ...）
    pub vendor_id: i64,
    pub outcome: ImportOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ImportReport {
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

// ==========================================
// ImportProgress - 导入进度事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportProgress {
    Started { task_id: String, source: String },
    Directory { index: usize, total: usize, directory: String },
    Finished { imported: usize, errors: usize },
}
