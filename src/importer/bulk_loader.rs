// ==========================================
// 供应商目录系统 - 批量装载器
// ==========================================
// 流程:
// 1. 逐条校验 + 转换（失败 → 记录级错误）
// 2. 按块切分（默认 1000 条）
// 3. 每块: 一次查询已有行 → 内存合并（与逐条 upsert 同一规则）
//    → 一条多行 INSERT ... ON CONFLICT DO UPDATE（单事务）
// 红线: 某块失败只记录一条错误，后续块继续
// ==========================================

use crate::domain::{CanonicalRecord, ImportOutcome, VendorProduct, VendorProductDraft};
use crate::importer::error::ImportResult;
use crate::importer::record_converter::{to_draft, validate_required};
use crate::importer::upsert::{ensure_vendor, record_error};
use crate::repository::CatalogStore;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

/// 默认块大小
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

pub struct BulkLoader {
    store: Arc<dyn CatalogStore>,
    chunk_size: usize,
}

impl BulkLoader {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// 自定义块大小（最小为 1）
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// 批量装载
    ///
    /// # 返回
    /// - ImportOutcome: 成功条数 + 记录级 / 块级错误
    pub async fn load(&self, records: Vec<CanonicalRecord>, vendor_id: i64) -> ImportOutcome {
        if let Err(outcome) = ensure_vendor(self.store.as_ref(), vendor_id).await {
            warn!(vendor_id, "批量导入中止: 供应商不存在");
            return outcome;
        }

        let mut outcome = ImportOutcome::default();

        // ===== 阶段 1: 校验 + 转换 =====
        let mut drafts = Vec::with_capacity(records.len());
        for record in &records {
            match validate_required(record).and_then(|_| to_draft(record)) {
                Ok(draft) => drafts.push(draft),
                Err(e) => {
                    warn!(vendor_id, row = record.row_number, error = %e, "记录校验失败");
                    outcome.errors.push(record_error(record, &e));
                }
            }
        }

        info!(
            vendor_id,
            valid = drafts.len(),
            rejected = outcome.errors.len(),
            chunk_size = self.chunk_size,
            "开始批量装载"
        );

        // ===== 阶段 2: 分块写入 =====
        for (index, chunk) in drafts.chunks(self.chunk_size).enumerate() {
            match self.load_chunk(chunk, vendor_id).await {
                Ok(written) => outcome.imported += written,
                Err(e) => {
                    warn!(vendor_id, chunk = index + 1, size = chunk.len(), error = %e, "块写入失败");
                    outcome.errors.push(format!(
                        "批次 #{} ({} 条) 写入失败: {}",
                        index + 1,
                        chunk.len(),
                        e
                    ));
                }
            }
        }

        info!(
            vendor_id,
            imported = outcome.imported,
            errors = outcome.errors.len(),
            "批量装载完成"
        );
        outcome
    }

    /// 单块: 查询 → 合并 → 多行 upsert
    ///
    /// # 返回
    /// - Ok(usize): 本块成功的记录数（块内重复 SKU 按顺序合并，仍各计一次）
    async fn load_chunk(
        &self,
        chunk: &[VendorProductDraft],
        vendor_id: i64,
    ) -> ImportResult<usize> {
        let repo = self.store.vendor_products();

        let mut seen = HashSet::new();
        let skus: Vec<String> = chunk
            .iter()
            .filter(|d| seen.insert(d.vendor_sku.clone()))
            .map(|d| d.vendor_sku.clone())
            .collect();

        let mut rows: HashMap<String, VendorProduct> = repo
            .find_by_vendor_skus(vendor_id, &skus)
            .await?
            .into_iter()
            .map(|p| (p.vendor_sku.clone(), p))
            .collect();

        for draft in chunk.iter().cloned() {
            let sku = draft.vendor_sku.clone();
            let merged = match rows.remove(&sku) {
                Some(existing) => draft.merge_into(existing),
                None => draft.into_new(vendor_id),
            };
            rows.insert(sku, merged);
        }

        // 按首次出现顺序写入
        let ordered: Vec<VendorProduct> = skus.iter().filter_map(|s| rows.remove(s)).collect();
        repo.upsert_many(&ordered).await?;

        Ok(chunk.len())
    }
}
