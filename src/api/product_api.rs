// ==========================================
// 供应商目录系统 - 商品 API
// ==========================================
// 职责: 主商品维护 + 供应商商品查询与关联
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{MasterProduct, VendorProduct};
use crate::repository::CatalogStore;

/// 主商品查找条件（自然键，按优先级）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum MasterProductKey {
    Sku(String),
    Upc(String),
    Mpn { manufacturer: String, mpn: String },
}

/// 供应商商品汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorCatalogSummary {
    pub vendor_id: i64,
    pub product_count: i64,
    pub linked_count: usize, // 已关联主商品的条数
    pub total_quantity: i64,
}

pub struct ProductApi {
    store: Arc<dyn CatalogStore>,
}

impl ProductApi {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    // ==========================================
    // 主商品
    // ==========================================

    /// 新增主商品
    ///
    /// # 返回
    /// - Err(BusinessRuleViolation): SKU 已被其他主商品占用
    pub async fn create_master_product(&self, product: MasterProduct) -> ApiResult<i64> {
        if product.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("商品名称不能为空".to_string()));
        }
        if let Some(sku) = product.normalized_sku() {
            if self.store.master_products().find_by_sku(sku).await?.is_some() {
                return Err(ApiError::BusinessRuleViolation(format!("SKU {} 已存在", sku)));
            }
        }
        Ok(self.store.master_products().save(&product).await?)
    }

    pub async fn update_master_product(&self, product: MasterProduct) -> ApiResult<()> {
        if product.id.is_none() {
            return Err(ApiError::InvalidInput("更新商品需要 ID".to_string()));
        }
        self.store.master_products().update(&product).await?;
        Ok(())
    }

    pub async fn delete_master_product(&self, id: i64) -> ApiResult<()> {
        if !self.store.master_products().delete(id).await? {
            return Err(ApiError::NotFound(format!("主商品(id={})不存在", id)));
        }
        Ok(())
    }

    pub async fn get_master_product(&self, id: i64) -> ApiResult<MasterProduct> {
        self.store
            .master_products()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("主商品(id={})不存在", id)))
    }

    /// 按自然键查找主商品
    pub async fn find_master_product(&self, key: &MasterProductKey) -> ApiResult<Option<MasterProduct>> {
        let repo = self.store.master_products();
        let found = match key {
            MasterProductKey::Sku(sku) => repo.find_by_sku(sku).await?,
            MasterProductKey::Upc(upc) => repo.find_by_upc(upc).await?,
            MasterProductKey::Mpn { manufacturer, mpn } => {
                repo.find_by_mpn(manufacturer, mpn).await?
            }
        };
        Ok(found)
    }

    pub async fn search_master_products(&self, keyword: &str) -> ApiResult<Vec<MasterProduct>> {
        if keyword.trim().is_empty() {
            return Ok(self.store.master_products().find_all().await?);
        }
        Ok(self.store.master_products().find_by_name(keyword.trim()).await?)
    }

    // ==========================================
    // 供应商商品
    // ==========================================

    pub async fn list_vendor_products(&self, vendor_id: i64) -> ApiResult<Vec<VendorProduct>> {
        Ok(self.store.vendor_products().find_by_vendor(vendor_id).await?)
    }

    pub async fn get_vendor_product(&self, vendor_id: i64, vendor_sku: &str) -> ApiResult<VendorProduct> {
        self.store
            .vendor_products()
            .find_by_vendor_sku(vendor_id, vendor_sku)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("供应商商品(vendor={}, sku={})不存在", vendor_id, vendor_sku))
            })
    }

    /// 同一主商品的各供应商报价
    pub async fn list_offers(&self, master_product_id: i64) -> ApiResult<Vec<VendorProduct>> {
        Ok(self
            .store
            .vendor_products()
            .find_by_master_product(master_product_id)
            .await?)
    }

    /// 关联 / 取消关联主商品
    pub async fn link_master_product(
        &self,
        vendor_product_id: i64,
        master_product_id: Option<i64>,
    ) -> ApiResult<()> {
        let repo = self.store.vendor_products();
        let mut product = repo
            .find_by_id(vendor_product_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("供应商商品(id={})不存在", vendor_product_id)))?;

        if let Some(master_id) = master_product_id {
            self.get_master_product(master_id).await?;
        }
        product.master_product_id = master_product_id;
        repo.update(&product).await?;

        tracing::info!(vendor_product_id, master_product_id, "主商品关联已更新");
        Ok(())
    }

    pub async fn delete_vendor_product(&self, id: i64) -> ApiResult<()> {
        if !self.store.vendor_products().delete(id).await? {
            return Err(ApiError::NotFound(format!("供应商商品(id={})不存在", id)));
        }
        Ok(())
    }

    /// 供应商商品汇总
    pub async fn vendor_summary(&self, vendor_id: i64) -> ApiResult<VendorCatalogSummary> {
        let repo = self.store.vendor_products();
        let product_count = repo.count_by_vendor(vendor_id).await?;
        let products = repo.find_by_vendor(vendor_id).await?;

        Ok(VendorCatalogSummary {
            vendor_id,
            product_count,
            linked_count: products.iter().filter(|p| p.master_product_id.is_some()).count(),
            total_quantity: products.iter().map(|p| p.quantity).sum(),
        })
    }
}
