// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的存储初始化、测试数据生成等功能
// ==========================================
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use vendor_catalog::domain::{RawRecord, Vendor};
use vendor_catalog::repository::{CatalogStore, SqliteCatalogStore};

/// 创建临时 SQLite 存储并建表
///
/// # 返回
/// - TempDir: 临时目录（需要保持存活）
/// - Arc<dyn CatalogStore>: 已建表的存储
pub async fn create_test_store() -> (TempDir, Arc<dyn CatalogStore>) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("catalog.db");
    let store = SqliteCatalogStore::open(db_path.to_str().unwrap()).unwrap();
    store.init_schema().await.unwrap();
    (dir, Arc::new(store))
}

/// 新增一个供应商并返回 ID
pub async fn create_vendor(store: &dyn CatalogStore, name: &str) -> i64 {
    store.vendors().save(&Vendor::new(name)).await.unwrap()
}

/// 在目录中写出文件
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// 由键值对构造原始记录
pub fn raw(pairs: &[(&str, &str)]) -> RawRecord {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// 生成 n 条带 sku/name/price 的原始记录（SKU-0001 起）
pub fn generate_records(n: usize) -> Vec<RawRecord> {
    (1..=n)
        .map(|i| {
            raw(&[
                ("sku", format!("SKU-{:04}", i).as_str()),
                ("name", format!("Product {}", i).as_str()),
                ("price", format!("{}.99", i).as_str()),
            ])
        })
        .collect()
}
