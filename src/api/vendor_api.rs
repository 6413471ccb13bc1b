// ==========================================
// 供应商目录系统 - 供应商 API
// ==========================================
// 职责: 供应商增删改查 + 分类维护
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{Category, RecordStatus, Vendor};
use crate::repository::CatalogStore;

/// 供应商 API
///
/// 职责：
/// 1. 供应商 CRUD（名称必填）
/// 2. 商品分类 CRUD（上级分类须存在）
pub struct VendorApi {
    store: Arc<dyn CatalogStore>,
}

impl VendorApi {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// 新增供应商
    ///
    /// # 返回
    /// - Ok(i64): 新供应商 ID
    /// - Err(ApiError::InvalidInput): 名称为空
    pub async fn create_vendor(&self, vendor: Vendor) -> ApiResult<i64> {
        if vendor.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("供应商名称不能为空".to_string()));
        }
        let id = self.store.vendors().save(&vendor).await?;
        tracing::info!(vendor_id = id, name = %vendor.name, "供应商已创建");
        Ok(id)
    }

    pub async fn update_vendor(&self, vendor: Vendor) -> ApiResult<()> {
        if vendor.id.is_none() {
            return Err(ApiError::InvalidInput("更新供应商需要 ID".to_string()));
        }
        if vendor.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("供应商名称不能为空".to_string()));
        }
        self.store.vendors().update(&vendor).await?;
        Ok(())
    }

    /// 删除供应商（其商品与连接随之级联删除）
    pub async fn delete_vendor(&self, id: i64) -> ApiResult<()> {
        if !self.store.vendors().delete(id).await? {
            return Err(ApiError::NotFound(format!("供应商(id={})不存在", id)));
        }
        tracing::info!(vendor_id = id, "供应商已删除");
        Ok(())
    }

    pub async fn get_vendor(&self, id: i64) -> ApiResult<Vendor> {
        self.store
            .vendors()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("供应商(id={})不存在", id)))
    }

    pub async fn list_vendors(&self) -> ApiResult<Vec<Vendor>> {
        Ok(self.store.vendors().find_all().await?)
    }

    /// 名称子串搜索（空关键字 → 全部）
    pub async fn search_vendors(&self, keyword: &str) -> ApiResult<Vec<Vendor>> {
        if keyword.trim().is_empty() {
            return self.list_vendors().await;
        }
        Ok(self.store.vendors().find_by_name(keyword.trim()).await?)
    }

    /// 设置供应商状态
    pub async fn set_vendor_status(&self, id: i64, status: RecordStatus) -> ApiResult<()> {
        let mut vendor = self.get_vendor(id).await?;
        vendor.status = status;
        self.store.vendors().update(&vendor).await?;
        Ok(())
    }

    // ==========================================
    // 分类
    // ==========================================

    pub async fn create_category(&self, category: Category) -> ApiResult<i64> {
        if category.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("分类名称不能为空".to_string()));
        }
        if let Some(parent_id) = category.parent_id {
            self.get_category(parent_id).await?;
        }
        Ok(self.store.categories().save(&category).await?)
    }

    pub async fn update_category(&self, category: Category) -> ApiResult<()> {
        let Some(id) = category.id else {
            return Err(ApiError::InvalidInput("更新分类需要 ID".to_string()));
        };
        if category.parent_id == Some(id) {
            return Err(ApiError::BusinessRuleViolation("分类不能以自身为上级".to_string()));
        }
        self.store.categories().update(&category).await?;
        Ok(())
    }

    pub async fn delete_category(&self, id: i64) -> ApiResult<()> {
        if !self.store.categories().delete(id).await? {
            return Err(ApiError::NotFound(format!("分类(id={})不存在", id)));
        }
        Ok(())
    }

    pub async fn get_category(&self, id: i64) -> ApiResult<Category> {
        self.store
            .categories()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("分类(id={})不存在", id)))
    }

    pub async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        Ok(self.store.categories().find_all().await?)
    }

    pub async fn list_child_categories(&self, parent_id: i64) -> ApiResult<Vec<Category>> {
        Ok(self.store.categories().find_children(parent_id).await?)
    }
}
