// ==========================================
// 供应商目录系统 - 逐条 Upsert 协调器
// ==========================================
// 流程（每条记录）:
// 1. 校验 sku / name
// 2. 按 (vendor_id, sku) 查询已有行
// 3. 存在 → 合并后更新（保留行标识）；不存在 → 新增
// 红线: 单条失败只记录错误，不中断整批
// ==========================================

use crate::domain::{CanonicalRecord, ImportOutcome};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::record_converter::{to_draft, validate_required};
use crate::repository::CatalogStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 记录级错误文本（含批内序号与原始记录）
pub fn record_error(record: &CanonicalRecord, err: &ImportError) -> String {
    format!(
        "记录 #{}: {} (原始数据: {})",
        record.row_number,
        err,
        record.raw_json()
    )
}

/// 供应商前置校验；不存在时返回 (0, [错误])
pub async fn ensure_vendor(store: &dyn CatalogStore, vendor_id: i64) -> Result<(), ImportOutcome> {
    match store.vendors().find_by_id(vendor_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(ImportOutcome::failed(
            ImportError::VendorNotFound(vendor_id).to_string(),
        )),
        Err(e) => Err(ImportOutcome::failed(ImportError::from(e).to_string())),
    }
}

pub struct UpsertCoordinator {
    store: Arc<dyn CatalogStore>,
}

impl UpsertCoordinator {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// 逐条 upsert
    ///
    /// # 参数
    /// - records: 规范记录（已完成字段映射）
    /// - vendor_id: 目标供应商
    ///
    /// # 返回
    /// - ImportOutcome: 成功条数 + 记录级错误列表
    pub async fn upsert_records(
        &self,
        records: Vec<CanonicalRecord>,
        vendor_id: i64,
    ) -> ImportOutcome {
        if let Err(outcome) = ensure_vendor(self.store.as_ref(), vendor_id).await {
            warn!(vendor_id, "导入中止: 供应商不存在");
            return outcome;
        }

        info!(vendor_id, records = records.len(), "开始逐条 upsert");
        let mut outcome = ImportOutcome::default();

        for record in &records {
            match self.upsert_one(record, vendor_id).await {
                Ok(()) => outcome.imported += 1,
                Err(e) => {
                    warn!(vendor_id, row = record.row_number, error = %e, "记录导入失败");
                    outcome.errors.push(record_error(record, &e));
                }
            }
        }

        info!(
            vendor_id,
            imported = outcome.imported,
            errors = outcome.errors.len(),
            "逐条 upsert 完成"
        );
        outcome
    }

    async fn upsert_one(&self, record: &CanonicalRecord, vendor_id: i64) -> ImportResult<()> {
        validate_required(record)?;
        let draft = to_draft(record)?;
        let repo = self.store.vendor_products();

        match repo.find_by_vendor_sku(vendor_id, &draft.vendor_sku).await? {
            Some(existing) => {
                let merged = draft.merge_into(existing);
                repo.update(&merged).await?;
                debug!(vendor_id, sku = %merged.vendor_sku, "更新已有商品");
            }
            None => {
                let product = draft.into_new(vendor_id);
                let id = repo.save(&product).await?;
                debug!(vendor_id, sku = %product.vendor_sku, id, "新增商品");
            }
        }
        Ok(())
    }
}
