// ==========================================
// SFTP 导入集成测试（内存模拟远程服务器）
// ==========================================

mod test_helpers;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use vendor_catalog::config::SftpImportConfig;
use vendor_catalog::domain::ImportProgress;
use vendor_catalog::importer::{
    pattern_matches, CatalogImporter, ImportError, ImportResult, RemoteConnector, RemoteSession,
    SftpReader,
};

use test_helpers::{create_test_store, create_vendor};

/// 目录 → (文件名 → 内容)
type RemoteTree = BTreeMap<String, BTreeMap<String, String>>;

struct FakeConnector {
    tree: RemoteTree,
    refuse_host: Option<String>,
    downloaded: Arc<Mutex<Vec<PathBuf>>>,
}

impl FakeConnector {
    fn new(tree: RemoteTree) -> Self {
        Self {
            tree,
            refuse_host: None,
            downloaded: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

struct FakeSession {
    tree: RemoteTree,
    downloaded: Arc<Mutex<Vec<PathBuf>>>,
}

impl RemoteConnector for FakeConnector {
    fn connect(&self, config: &SftpImportConfig) -> ImportResult<Box<dyn RemoteSession>> {
        if self.refuse_host.as_deref() == Some(config.host.as_str()) {
            return Err(ImportError::TransportError(format!("{} 拒绝连接", config.host)));
        }
        Ok(Box::new(FakeSession {
            tree: self.tree.clone(),
            downloaded: Arc::clone(&self.downloaded),
        }))
    }
}

impl RemoteSession for FakeSession {
    fn list_files(&mut self, directory: &str) -> ImportResult<Vec<String>> {
        self.tree
            .get(directory)
            .map(|files| files.keys().cloned().collect())
            .ok_or_else(|| ImportError::RemoteError(format!("目录不存在: {}", directory)))
    }

    fn download(&mut self, directory: &str, filename: &str, local_path: &Path) -> ImportResult<()> {
        let content = &self.tree[directory][filename];
        fs::write(local_path, content)?;
        self.downloaded.lock().unwrap().push(local_path.to_path_buf());
        Ok(())
    }
}

fn tree(entries: &[(&str, &[(&str, &str)])]) -> RemoteTree {
    entries
        .iter()
        .map(|(dir, files)| {
            (
                dir.to_string(),
                files
                    .iter()
                    .map(|(name, content)| (name.to_string(), content.to_string()))
                    .collect(),
            )
        })
        .collect()
}

fn sftp_config(host: &str, directory: &str, pattern: &str) -> SftpImportConfig {
    let mut config = SftpImportConfig::new(host, "feed");
    config.directory = directory.to_string();
    config.file_pattern = pattern.to_string();
    config
}

#[test]
fn test_glob_patterns() {
    assert!(pattern_matches("prices.csv", "*.csv"));
    assert!(!pattern_matches("prices.csv.gz", "*.csv"));
    assert!(!pattern_matches("report.csv.bak", "*.csv"));
    assert!(pattern_matches("data_2024.json", "data_*"));
    assert!(pattern_matches("q1_sales_final.csv", "*sales*"));
    assert!(pattern_matches("data_0101.xlsx", "data_*"));
    assert!(!pattern_matches("mydata_0101.xlsx", "data_*"));
    assert!(pattern_matches("weekly_sales_eu.json", "*sales*"));
    assert!(!pattern_matches("weekly_stock.json", "*sales*"));
}

#[tokio::test]
async fn test_sftp_import_matching_files_and_cleanup() {
    let (_dir, store) = create_test_store().await;
    let vendor_id = create_vendor(store.as_ref(), "Remote").await;

    let connector = FakeConnector::new(tree(&[(
        "/outgoing",
        &[
            ("a.csv", "sku,name\nR1,Remote One\nR2,Remote Two\n"),
            ("b.csv", "sku,name\nR3,Remote Three\n"),
            ("readme.txt", "ignore me"),
        ],
    )]));
    let downloaded = Arc::clone(&connector.downloaded);

    let importer = CatalogImporter::new(store.clone())
        .with_sftp_reader(SftpReader::new(Arc::new(connector)));
    let outcome = importer
        .import_from_sftp(&sftp_config("sftp.local", "/outgoing", "*.csv"), vendor_id, None)
        .await;

    assert_eq!(outcome.as_tuple(), (3, vec![]));
    assert_eq!(store.vendor_products().count_by_vendor(vendor_id).await.unwrap(), 3);

    let downloaded = downloaded.lock().unwrap();
    assert_eq!(downloaded.len(), 2);
    assert!(downloaded.iter().all(|p| !p.exists()), "临时文件应已删除");
}

#[tokio::test]
async fn test_sftp_no_matching_files() {
    let (_dir, store) = create_test_store().await;
    let vendor_id = create_vendor(store.as_ref(), "Remote").await;

    let connector = FakeConnector::new(tree(&[("/", &[("stock.xml", "<product/>")])]));
    let importer = CatalogImporter::new(store.clone())
        .with_sftp_reader(SftpReader::new(Arc::new(connector)));

    let outcome = importer
        .import_from_sftp(&sftp_config("sftp.local", "/", "*.csv"), vendor_id, None)
        .await;

    assert_eq!(outcome.imported, 0);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("没有匹配的文件"));
}

#[tokio::test]
async fn test_sftp_bad_file_does_not_stop_others() {
    let (_dir, store) = create_test_store().await;
    let vendor_id = create_vendor(store.as_ref(), "Remote").await;

    let connector = FakeConnector::new(tree(&[(
        "/in",
        &[
            ("feed_1.json", "{not json"),
            ("feed_2.json", r#"[{"sku": "J1", "name": "Json"}]"#),
        ],
    )]));
    let importer = CatalogImporter::new(store.clone())
        .with_sftp_reader(SftpReader::new(Arc::new(connector)));

    let outcome = importer
        .import_from_sftp(&sftp_config("sftp.local", "/in", "feed_*"), vendor_id, None)
        .await;

    assert_eq!(outcome.imported, 1);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("feed_1.json"));
}

#[tokio::test]
async fn test_multiple_directories_aggregate_and_report_progress() {
    let (_dir, store) = create_test_store().await;
    let vendor_id = create_vendor(store.as_ref(), "Remote").await;

    let mut connector = FakeConnector::new(tree(&[
        ("/east", &[("east_sales.csv", "sku,name\nE1,East\n")]),
        ("/west", &[("west_sales.csv", "sku,name\nW1,West\nW2,West 2\n")]),
    ]));
    connector.refuse_host = Some("down.local".to_string());
    let importer = CatalogImporter::new(store.clone())
        .with_sftp_reader(SftpReader::new(Arc::new(connector)));

    let configs = vec![
        sftp_config("sftp.local", "/east", "*sales*"),
        sftp_config("down.local", "/east", "*"),
        sftp_config("sftp.local", "/west", "*sales*"),
    ];
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let outcome = importer
        .import_from_multiple_sftp(&configs, vendor_id, None, Some(&tx))
        .await;
    drop(tx);

    assert_eq!(outcome.imported, 3);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("down.local"));

    let mut directories = Vec::new();
    while let Some(event) = rx.recv().await {
        if let ImportProgress::Directory { index, total, .. } = event {
            directories.push((index, total));
        }
    }
    assert_eq!(directories, vec![(1, 3), (2, 3), (3, 3)]);
}
