// ==========================================
// 后台导入任务测试
// ==========================================

mod test_helpers;

use std::sync::Arc;

use vendor_catalog::domain::ImportProgress;
use vendor_catalog::importer::{spawn_import, CatalogImporter, ImportJob};

use test_helpers::{create_test_store, create_vendor, write_file};

async fn collect_events(
    handle: &mut vendor_catalog::importer::ImportTaskHandle,
) -> Vec<ImportProgress> {
    let mut events = Vec::new();
    while let Some(event) = handle.progress.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_background_file_import_reports_progress() {
    let (dir, store) = create_test_store().await;
    let vendor_id = create_vendor(store.as_ref(), "Acme").await;
    let csv = write_file(dir.path(), "bg.csv", "sku,name\nT1,One\nT2,Two\n");

    let importer = Arc::new(CatalogImporter::new(store.clone()));
    let mut handle = spawn_import(importer, ImportJob::File(csv), vendor_id, None);
    let task_id = handle.task_id.clone();

    let events = collect_events(&mut handle).await;
    let report = handle.wait().await.unwrap();

    assert_eq!(report.task_id, task_id);
    assert_eq!(report.vendor_id, vendor_id);
    assert!(report.source.starts_with("file:"));
    assert_eq!(report.outcome.as_tuple(), (2, vec![]));
    assert!(report.finished_at >= report.started_at);

    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], ImportProgress::Started { task_id: id, .. } if *id == task_id));
    assert!(matches!(
        events[1],
        ImportProgress::Finished { imported: 2, errors: 0 }
    ));
}

#[tokio::test]
async fn test_background_failures_are_in_report() {
    let (_dir, store) = create_test_store().await;
    let importer = Arc::new(CatalogImporter::new(store.clone()));

    // 未知连接
    let mut handle = spawn_import(Arc::clone(&importer), ImportJob::Connection(77), 0, None);
    let events = collect_events(&mut handle).await;
    let report = handle.wait().await.unwrap();

    assert_eq!(report.source, "connection:77");
    assert_eq!(report.outcome.imported, 0);
    assert_eq!(report.outcome.errors.len(), 1);
    assert!(matches!(
        events.last(),
        Some(ImportProgress::Finished { imported: 0, errors: 1 })
    ));
}

#[tokio::test]
async fn test_concurrent_background_tasks() {
    let (dir, store) = create_test_store().await;
    let first = create_vendor(store.as_ref(), "First").await;
    let second = create_vendor(store.as_ref(), "Second").await;
    let importer = Arc::new(CatalogImporter::new(store.clone()));

    let a = write_file(dir.path(), "a.csv", "sku,name\nA1,A\nA2,B\nA3,C\n");
    let edi = "LIN*1*VP*Z-1~PID*F****Edi~";

    let handle_a = spawn_import(Arc::clone(&importer), ImportJob::FileBulk(a), first, None);
    let handle_b = spawn_import(
        Arc::clone(&importer),
        ImportJob::EdiText(edi.to_string()),
        second,
        None,
    );
    assert_ne!(handle_a.task_id, handle_b.task_id);

    let (report_a, report_b) = tokio::join!(handle_a.wait(), handle_b.wait());
    assert_eq!(report_a.unwrap().outcome.imported, 3);
    assert_eq!(report_b.unwrap().outcome.imported, 1);

    assert_eq!(store.vendor_products().count_by_vendor(first).await.unwrap(), 3);
    assert_eq!(store.vendor_products().count_by_vendor(second).await.unwrap(), 1);
}
