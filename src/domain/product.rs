// ==========================================
// 供应商目录系统 - 商品领域模型
// ==========================================
// 对齐: categories / master_products / vendor_products 表
// ==========================================
// 红线: (vendor_id, vendor_sku) 唯一，是导入 upsert 的自然键
// ==========================================

use crate::domain::types::RecordStatus;
use serde::{Deserialize, Serialize};

/// 属性袋（未提升为独立列的字段）
pub type PropertyBag = serde_json::Map<String, serde_json::Value>;

// ==========================================
// Category - 商品分类（自引用层级）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub parent_id: Option<i64>, // 上级分类
    pub description: Option<String>,
    pub status: RecordStatus,
}

impl Category {
    pub fn new(name: impl Into<String>, parent_id: Option<i64>) -> Self {
        Self {
            id: None,
            name: name.into(),
            parent_id,
            description: None,
            status: RecordStatus::Active,
        }
    }
}

// ==========================================
// MasterProduct - 主商品（与供应商无关的标准商品）
// ==========================================
// 约束: sku 非空时全局唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterProduct {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub upc: Option<String>,
    pub manufacturer: Option<String>,
    pub manufacturer_part_number: Option<String>,
    pub category_id: Option<i64>,
    pub specs: PropertyBag, // 规格参数（自由键值）
    pub status: RecordStatus,
}

impl MasterProduct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            sku: None,
            upc: None,
            manufacturer: None,
            manufacturer_part_number: None,
            category_id: None,
            specs: PropertyBag::new(),
            status: RecordStatus::Active,
        }
    }

    /// 写库用 SKU：去除首尾空白，空白视为未设置
    pub fn normalized_sku(&self) -> Option<&str> {
        non_blank(self.sku.as_deref())
    }

    /// 写库用 UPC：规则同 SKU
    pub fn normalized_upc(&self) -> Option<&str> {
        non_blank(self.upc.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ==========================================
// VendorProduct - 供应商商品报价
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorProduct {
    // ===== 主键与关联 =====
    pub id: Option<i64>,
    pub vendor_id: i64,                 // 所属供应商（必填）
    pub master_product_id: Option<i64>, // 关联主商品（可选）
    pub vendor_sku: String,             // 供应商 SKU

    // ===== 价格档位 =====
    pub vendor_price: Option<f64>, // 进货价
    pub list_price: Option<f64>,   // 标价
    pub map_price: Option<f64>,    // 最低广告价 (MAP)
    pub mrp_price: Option<f64>,    // 建议零售价 (MRP)

    // ===== 库存（总量 + 分区域）=====
    pub quantity: i64,
    pub quantity_nj: i64,
    pub quantity_fl: i64,

    // ===== 到货时间（总体 + 分区域）=====
    pub eta: Option<String>,
    pub eta_nj: Option<String>,
    pub eta_fl: Option<String>,

    // ===== 物流 =====
    pub shipping_weight: Option<f64>,
    pub shipping_dimensions: Option<String>,

    // ===== 扩展 =====
    pub props: PropertyBag,
    pub status: RecordStatus,
}

impl VendorProduct {
    pub fn new(vendor_id: i64, vendor_sku: impl Into<String>) -> Self {
        Self {
            id: None,
            vendor_id,
            master_product_id: None,
            vendor_sku: vendor_sku.into(),
            vendor_price: None,
            list_price: None,
            map_price: None,
            mrp_price: None,
            quantity: 0,
            quantity_nj: 0,
            quantity_fl: 0,
            eta: None,
            eta_nj: None,
            eta_fl: None,
            shipping_weight: None,
            shipping_dimensions: None,
            props: PropertyBag::new(),
            status: RecordStatus::Active,
        }
    }
}

// ==========================================
// VendorProductDraft - 导入得到的供应商商品草稿
// ==========================================
// 用途: 规范记录转换结果；None 表示导入源未提供该字段
// 合并规则（逐条 upsert 与批量装载共用）:
// - 导入源提供的字段覆盖已有值，未提供的字段保留已有值
// - 属性袋按键合并，新键覆盖旧键
// - 行主键 / 所属供应商 / 主商品关联保持不变
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VendorProductDraft {
    pub vendor_sku: String,
    pub vendor_price: Option<f64>,
    pub list_price: Option<f64>,
    pub map_price: Option<f64>,
    pub mrp_price: Option<f64>,
    pub quantity: Option<i64>,
    pub quantity_nj: Option<i64>,
    pub quantity_fl: Option<i64>,
    pub eta: Option<String>,
    pub eta_nj: Option<String>,
    pub eta_fl: Option<String>,
    pub shipping_weight: Option<f64>,
    pub shipping_dimensions: Option<String>,
    pub props: PropertyBag,
    pub status: Option<RecordStatus>,
}

impl VendorProductDraft {
    /// 作为新行落库
    pub fn into_new(self, vendor_id: i64) -> VendorProduct {
        let base = VendorProduct::new(vendor_id, self.vendor_sku.clone());
        self.merge_into(base)
    }

    /// 合并到已有行（保留行标识）
    pub fn merge_into(self, existing: VendorProduct) -> VendorProduct {
        let mut props = existing.props;
        for (key, value) in self.props {
            props.insert(key, value);
        }

        VendorProduct {
            id: existing.id,
            vendor_id: existing.vendor_id,
            master_product_id: existing.master_product_id,
            vendor_sku: self.vendor_sku,
            vendor_price: self.vendor_price.or(existing.vendor_price),
            list_price: self.list_price.or(existing.list_price),
            map_price: self.map_price.or(existing.map_price),
            mrp_price: self.mrp_price.or(existing.mrp_price),
            quantity: self.quantity.unwrap_or(existing.quantity),
            quantity_nj: self.quantity_nj.unwrap_or(existing.quantity_nj),
            quantity_fl: self.quantity_fl.unwrap_or(existing.quantity_fl),
            eta: self.eta.or(existing.eta),
            eta_nj: self.eta_nj.or(existing.eta_nj),
            eta_fl: self.eta_fl.or(existing.eta_fl),
            shipping_weight: self.shipping_weight.or(existing.shipping_weight),
            shipping_dimensions: self.shipping_dimensions.or(existing.shipping_dimensions),
            props,
            status: self.status.unwrap_or(existing.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_natural_keys_normalize_to_none() {
        let mut product = MasterProduct::new("Blank");
        product.sku = Some("   ".to_string());
        product.upc = Some(String::new());
        assert_eq!(product.normalized_sku(), None);
        assert_eq!(product.normalized_upc(), None);

        product.sku = Some(" M-1 ".to_string());
        assert_eq!(product.normalized_sku(), Some("M-1"));
    }

    #[test]
    fn test_draft_into_new_uses_defaults() {
        let draft = VendorProductDraft {
            vendor_sku: "SKU-1".to_string(),
            vendor_price: Some(9.5),
            ..Default::default()
        };

        let product = draft.into_new(7);

        assert_eq!(product.id, None);
        assert_eq!(product.vendor_id, 7);
        assert_eq!(product.vendor_sku, "SKU-1");
        assert_eq!(product.vendor_price, Some(9.5));
        assert_eq!(product.quantity, 0);
        assert_eq!(product.status, RecordStatus::Active);
    }

    #[test]
    fn test_draft_merge_keeps_identity_and_absent_fields() {
        let mut existing = VendorProduct::new(3, "SKU-1");
        existing.id = Some(42);
        existing.master_product_id = Some(5);
        existing.list_price = Some(20.0);
        existing.quantity_nj = 8;
        existing.props.insert("name".to_string(), json!("Old"));
        existing.props.insert("color".to_string(), json!("red"));

        let mut props = PropertyBag::new();
        props.insert("name".to_string(), json!("New"));
        let draft = VendorProductDraft {
            vendor_sku: "SKU-1".to_string(),
            vendor_price: Some(11.0),
            quantity: Some(4),
            props,
            ..Default::default()
        };

        let merged = draft.merge_into(existing);

        assert_eq!(merged.id, Some(42));
        assert_eq!(merged.master_product_id, Some(5));
        assert_eq!(merged.vendor_price, Some(11.0));
        assert_eq!(merged.list_price, Some(20.0));
        assert_eq!(merged.quantity, 4);
        assert_eq!(merged.quantity_nj, 8);
        assert_eq!(merged.props.get("name"), Some(&json!("New")));
        assert_eq!(merged.props.get("color"), Some(&json!("red")));
    }
}
