// ==========================================
// 供应商目录系统 - 字段映射器实现
// ==========================================
// 职责: 源字段 → 目标字段（按别名优先级）
// 规则:
// - 每个目标字段按候选顺序尝试，第一个非空（trim 后）值胜出
// - 映射中任何候选列表都未提及的源字段原样进入属性袋
// ==========================================

use crate::domain::{CanonicalRecord, FieldMapping, RawRecord};
use std::collections::BTreeMap;

pub struct FieldMapper {
    mapping: FieldMapping,
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new(None)
    }
}

impl FieldMapper {
    /// # 参数
    /// - mapping: 自定义映射；None 时使用默认映射
    pub fn new(mapping: Option<FieldMapping>) -> Self {
        Self {
            mapping: mapping.unwrap_or_default(),
        }
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    /// 映射单条记录
    ///
    /// # 参数
    /// - raw: 原始记录
    /// - row_number: 批内序号（从 1 开始）
    pub fn map_record(&self, raw: RawRecord, row_number: usize) -> CanonicalRecord {
        let mut fields = BTreeMap::new();
        for (target, aliases) in self.mapping.iter() {
            if let Some(value) = Self::first_present(&raw, aliases) {
                fields.insert(target.clone(), value);
            }
        }

        let properties = raw
            .iter()
            .filter(|(key, _)| !self.mapping.mentions(key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        CanonicalRecord {
            row_number,
            fields,
            properties,
            raw,
        }
    }

    /// 映射整批记录（序号从 1 开始）
    pub fn map_records(&self, raws: Vec<RawRecord>) -> Vec<CanonicalRecord> {
        raws.into_iter()
            .enumerate()
            .map(|(i, raw)| self.map_record(raw, i + 1))
            .collect()
    }

    /// 尝试所有可能的列名
    fn first_present(raw: &RawRecord, aliases: &[String]) -> Option<String> {
        aliases.iter().find_map(|alias| {
            raw.get(alias)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_first_alias_wins() {
        let mapper = FieldMapper::default();
        let record = mapper.map_record(raw(&[("sku", "A"), ("product_id", "B")]), 1);
        assert_eq!(record.field("sku"), Some("A"));
    }

    #[test]
    fn test_blank_alias_falls_through() {
        let mapper = FieldMapper::default();
        let record = mapper.map_record(raw(&[("sku", "  "), ("product_id", "B")]), 1);
        assert_eq!(record.field("sku"), Some("B"));
    }

    #[test]
    fn test_unmapped_keys_go_to_properties() {
        let mapper = FieldMapper::default();
        let record = mapper.map_record(
            raw(&[("sku", "A"), ("name", "Widget"), ("qtynj", "4"), ("color", " red ")]),
            3,
        );

        assert_eq!(record.row_number, 3);
        assert_eq!(record.properties.get("qtynj").map(String::as_str), Some("4"));
        assert_eq!(record.properties.get("color").map(String::as_str), Some(" red "));
        assert!(!record.properties.contains_key("sku"));
        assert_eq!(record.raw.len(), 4);
    }

    #[test]
    fn test_description_feeds_both_name_and_description() {
        let mapper = FieldMapper::default();
        let record = mapper.map_record(raw(&[("description", "Blue pen")]), 1);
        assert_eq!(record.field("name"), Some("Blue pen"));
        assert_eq!(record.field("description"), Some("Blue pen"));
    }

    #[test]
    fn test_custom_mapping() {
        let mut entries = BTreeMap::new();
        entries.insert("sku".to_string(), vec!["ItemNo".to_string()]);
        let mapper = FieldMapper::new(Some(FieldMapping::new(entries)));

        let record = mapper.map_record(raw(&[("ItemNo", "X9"), ("sku", "ignored")]), 1);

        assert_eq!(record.field("sku"), Some("X9"));
        assert_eq!(record.properties.get("sku").map(String::as_str), Some("ignored"));
    }
}
