// ==========================================
// 供应商目录系统 - 规范记录 → 供应商商品草稿
// ==========================================
// 使用方: UpsertCoordinator（逐条）与 BulkLoader（批量）共用
// 规则:
// - sku → vendor_sku / price → vendor_price / weight → shipping_weight
//   / dimensions → shipping_dimensions / status → RecordStatus
// - name / description / category / brand / upc 进入属性袋
// - 属性袋中的供应商专用键提升为独立列（并从属性袋移除）
// - 数字允许货币符号与千分位；无法解析为记录级错误
// ==========================================

use crate::domain::{CanonicalRecord, PropertyBag, RecordStatus, VendorProductDraft};
use crate::importer::error::{ImportError, ImportResult};
use serde_json::Value;

/// 必填目标字段
pub const REQUIRED_FIELDS: [&str; 2] = ["sku", "name"];

/// 进入属性袋的目标字段
const BAG_FIELDS: [&str; 5] = ["name", "description", "category", "brand", "upc"];

/// 校验必填字段
pub fn validate_required(record: &CanonicalRecord) -> ImportResult<()> {
    for field in REQUIRED_FIELDS {
        if record.field(field).is_none() {
            return Err(ImportError::MissingRequiredField {
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

/// 转换为草稿（调用前应已通过 validate_required）
pub fn to_draft(record: &CanonicalRecord) -> ImportResult<VendorProductDraft> {
    let vendor_sku = record
        .field("sku")
        .ok_or_else(|| ImportError::MissingRequiredField {
            field: "sku".to_string(),
        })?
        .to_string();

    // 属性袋：映射未提及的源字段 + 无独立列的目标字段
    let mut bag: PropertyBag = record
        .properties
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    for field in BAG_FIELDS {
        if let Some(value) = record.field(field) {
            bag.insert(field.to_string(), Value::String(value.to_string()));
        }
    }

    let mut draft = VendorProductDraft {
        vendor_sku,
        vendor_price: parse_price("price", record.field("price"))?,
        shipping_weight: parse_price("weight", record.field("weight"))?,
        shipping_dimensions: record.field("dimensions").map(str::to_string),
        status: record.field("status").map(RecordStatus::from_import_value),
        ..Default::default()
    };

    // ===== 价格档位 =====
    draft.list_price = parse_price("list_price", take(&mut bag, &["list", "list_price"]).as_deref())?;
    draft.map_price = parse_price("map_price", take(&mut bag, &["map", "map_price"]).as_deref())?;
    draft.mrp_price = parse_price("mrp_price", take(&mut bag, &["mrp", "mrp_price"]).as_deref())?;

    // ===== 库存 =====
    draft.quantity = parse_quantity("quantity", take(&mut bag, &["qty", "quantity"]).as_deref())?;
    draft.quantity_nj =
        parse_quantity("quantity_nj", take(&mut bag, &["qtynj", "quantity_nj"]).as_deref())?;
    draft.quantity_fl =
        parse_quantity("quantity_fl", take(&mut bag, &["qtyfl", "quantity_fl"]).as_deref())?;

    // ===== 到货时间 =====
    draft.eta = take(&mut bag, &["eta"]);
    draft.eta_nj = take(&mut bag, &["etanj", "eta_nj"]);
    draft.eta_fl = take(&mut bag, &["etafl", "eta_fl"]);

    // ===== 物流兜底 =====
    let wt = take(&mut bag, &["wt"]);
    if draft.shipping_weight.is_none() {
        draft.shipping_weight = parse_price("wt", wt.as_deref())?;
    }
    let (bl, bw, bh) = (
        take(&mut bag, &["bl"]),
        take(&mut bag, &["bw"]),
        take(&mut bag, &["bh"]),
    );
    if draft.shipping_dimensions.is_none() {
        if let (Some(l), Some(w), Some(h)) = (bl, bw, bh) {
            draft.shipping_dimensions = Some(format!("{}x{}x{}", l, w, h));
        }
    }

    draft.props = bag;
    Ok(draft)
}

/// 取出并移除属性袋中的首个非空键（键名大小写不敏感）
fn take(bag: &mut PropertyBag, aliases: &[&str]) -> Option<String> {
    let mut found = None;
    for alias in aliases {
        let keys: Vec<String> = bag
            .keys()
            .filter(|k| k.trim().eq_ignore_ascii_case(alias))
            .cloned()
            .collect();
        for key in keys {
            if let Some(value) = bag.remove(&key) {
                let text = match value {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                };
                if found.is_none() && !text.is_empty() {
                    found = Some(text);
                }
            }
        }
    }
    found
}

/// 数字清洗：去掉货币符号、千分位与空白
fn clean_number(text: &str) -> String {
    text.trim()
        .trim_start_matches(['$', '€', '£', '¥'])
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect()
}

/// 解析小数（空 → None）
pub fn parse_price(field: &str, text: Option<&str>) -> ImportResult<Option<f64>> {
    let Some(raw) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    clean_number(raw)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| ImportError::TypeConversionError {
            field: field.to_string(),
            message: format!("无法解析为数字: {}", raw),
        })
}

/// 解析整数数量（允许 "12.0" 这类整值小数）
pub fn parse_quantity(field: &str, text: Option<&str>) -> ImportResult<Option<i64>> {
    let Some(raw) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let cleaned = clean_number(raw);
    if let Ok(v) = cleaned.parse::<i64>() {
        return Ok(Some(v));
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(Some(v as i64)),
        _ => Err(ImportError::TypeConversionError {
            field: field.to_string(),
            message: format!("无法解析为整数: {}", raw),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRecord;
    use crate::importer::field_mapper::FieldMapper;
    use serde_json::json;

    fn canonical(pairs: &[(&str, &str)]) -> CanonicalRecord {
        let raw: RawRecord = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        FieldMapper::default().map_record(raw, 1)
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required(&canonical(&[("sku", "A"), ("name", "N")])).is_ok());
        assert!(matches!(
            validate_required(&canonical(&[("name", "N")])),
            Err(ImportError::MissingRequiredField { field }) if field == "sku"
        ));
        assert!(matches!(
            validate_required(&canonical(&[("sku", "A"), ("name", " ")])),
            Err(ImportError::MissingRequiredField { field }) if field == "name"
        ));
    }

    #[test]
    fn test_to_draft_promotes_vendor_columns() {
        let record = canonical(&[
            ("sku", "A1"),
            ("name", "Widget"),
            ("price", "$1,234.50"),
            ("brand", "Acme"),
            ("LIST", "1500"),
            ("qtynj", "7"),
            ("qty", "12.0"),
            ("etafl", "2026-11-01"),
            ("wt", "2.5"),
            ("bl", "10"),
            ("bw", "20"),
            ("bh", "30"),
            ("color", "red"),
        ]);

        let draft = to_draft(&record).unwrap();

        assert_eq!(draft.vendor_sku, "A1");
        assert_eq!(draft.vendor_price, Some(1234.5));
        assert_eq!(draft.list_price, Some(1500.0));
        assert_eq!(draft.quantity, Some(12));
        assert_eq!(draft.quantity_nj, Some(7));
        assert_eq!(draft.quantity_fl, None);
        assert_eq!(draft.eta_fl.as_deref(), Some("2026-11-01"));
        assert_eq!(draft.shipping_weight, Some(2.5));
        assert_eq!(draft.shipping_dimensions.as_deref(), Some("10x20x30"));
        assert_eq!(draft.props.get("name"), Some(&json!("Widget")));
        assert_eq!(draft.props.get("brand"), Some(&json!("Acme")));
        assert_eq!(draft.props.get("color"), Some(&json!("red")));
        assert!(!draft.props.contains_key("LIST"));
        assert!(!draft.props.contains_key("bl"));
        assert_eq!(draft.status, None);
    }

    #[test]
    fn test_weight_column_beats_wt_fallback() {
        let record = canonical(&[("sku", "A"), ("name", "N"), ("weight", "1"), ("wt", "9")]);
        let draft = to_draft(&record).unwrap();
        assert_eq!(draft.shipping_weight, Some(1.0));
        assert!(!draft.props.contains_key("wt"));
    }

    #[test]
    fn test_status_mapping() {
        let inactive = to_draft(&canonical(&[("sku", "A"), ("name", "N"), ("status", "Discontinued")])).unwrap();
        assert_eq!(inactive.status, Some(RecordStatus::Inactive));
        let active = to_draft(&canonical(&[("sku", "A"), ("name", "N"), ("is_active", "yes")])).unwrap();
        assert_eq!(active.status, Some(RecordStatus::Active));
    }

    #[test]
    fn test_bad_number_is_conversion_error() {
        let result = to_draft(&canonical(&[("sku", "A"), ("name", "N"), ("price", "call us")]));
        assert!(matches!(
            result,
            Err(ImportError::TypeConversionError { field, .. }) if field == "price"
        ));
    }
}
