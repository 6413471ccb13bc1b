// ==========================================
// Repository 集成测试（SQLite 后端）
// ==========================================
// 测试目标: 五个仓储的 CRUD、自然键查询与级联删除
// ==========================================

mod test_helpers;

use serde_json::json;
use vendor_catalog::domain::{
    Category, ConnectionType, MasterProduct, RecordStatus, Vendor, VendorConnection,
    VendorProduct,
};
use vendor_catalog::repository::RepositoryError;

use test_helpers::{create_test_store, create_vendor};

// ==========================================
// 供应商
// ==========================================

#[tokio::test]
async fn test_vendor_crud() {
    let (_dir, store) = create_test_store().await;
    let vendors = store.vendors();

    let id = vendors
        .save(&Vendor::new("Acme Supply").with_contact_info("sales@acme.test"))
        .await
        .unwrap();
    vendors.save(&Vendor::new("Globex")).await.unwrap();

    let mut acme = vendors.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(acme.contact_info.as_deref(), Some("sales@acme.test"));
    assert_eq!(acme.status, RecordStatus::Active);

    acme.status = RecordStatus::Inactive;
    acme.description = Some("primary distributor".to_string());
    vendors.update(&acme).await.unwrap();

    let reloaded = vendors.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, RecordStatus::Inactive);
    assert_eq!(reloaded.description.as_deref(), Some("primary distributor"));

    let found = vendors.find_by_name("acme").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(vendors.find_all().await.unwrap().len(), 2);

    assert!(vendors.delete(id).await.unwrap());
    assert!(!vendors.delete(id).await.unwrap());
    assert!(vendors.find_by_id(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_name_search_treats_wildcards_literally() {
    let (_dir, store) = create_test_store().await;
    let vendors = store.vendors();
    vendors.save(&Vendor::new("100% Cotton")).await.unwrap();
    vendors.save(&Vendor::new("Acme")).await.unwrap();
    vendors.save(&Vendor::new("East_West")).await.unwrap();
    vendors.save(&Vendor::new("EastxWest")).await.unwrap();

    let percent = vendors.find_by_name("%").await.unwrap();
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0].name, "100% Cotton");

    let underscore = vendors.find_by_name("t_W").await.unwrap();
    assert_eq!(underscore.len(), 1);
    assert_eq!(underscore[0].name, "East_West");
    assert!(vendors.find_by_name("\\").await.unwrap().is_empty());

    let masters = store.master_products();
    masters.save(&MasterProduct::new("50% off bundle")).await.unwrap();
    masters.save(&MasterProduct::new("Plain")).await.unwrap();
    assert_eq!(masters.find_by_name("%").await.unwrap().len(), 1);

    let categories = store.categories();
    categories.save(&Category::new("a_b", None)).await.unwrap();
    categories.save(&Category::new("axb", None)).await.unwrap();
    assert_eq!(categories.find_by_name("a_").await.unwrap().len(), 1);

    let vendor_id = percent[0].id.unwrap();
    let connections = store.connections();
    connections
        .save(&VendorConnection::new(vendor_id, "feed_1", ConnectionType::Api))
        .await
        .unwrap();
    connections
        .save(&VendorConnection::new(vendor_id, "feedx1", ConnectionType::Api))
        .await
        .unwrap();
    assert_eq!(connections.find_by_name("d_").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_missing_vendor_is_not_found() {
    let (_dir, store) = create_test_store().await;
    let mut ghost = Vendor::new("Ghost");
    ghost.id = Some(999);

    let result = store.vendors().update(&ghost).await;
    assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
}

// ==========================================
// 分类
// ==========================================

#[tokio::test]
async fn test_category_tree() {
    let (_dir, store) = create_test_store().await;
    let categories = store.categories();

    let root = categories.save(&Category::new("Tools", None)).await.unwrap();
    categories
        .save(&Category::new("Drills", Some(root)))
        .await
        .unwrap();
    categories
        .save(&Category::new("Saws", Some(root)))
        .await
        .unwrap();

    let children = categories.find_children(root).await.unwrap();
    assert_eq!(children.len(), 2);
    assert!(children.iter().all(|c| c.parent_id == Some(root)));

    // 删除上级后子分类保留，parent_id 置空
    assert!(categories.delete(root).await.unwrap());
    let orphans = categories.find_all().await.unwrap();
    assert_eq!(orphans.len(), 2);
    assert!(orphans.iter().all(|c| c.parent_id.is_none()));
}

// ==========================================
// 主商品
// ==========================================

#[tokio::test]
async fn test_master_product_natural_keys() {
    let (_dir, store) = create_test_store().await;
    let masters = store.master_products();

    let mut drill = MasterProduct::new("Cordless Drill");
    drill.sku = Some("M-100".to_string());
    drill.upc = Some("012345678905".to_string());
    drill.manufacturer = Some("Makita".to_string());
    drill.manufacturer_part_number = Some("XFD131".to_string());
    drill.specs.insert("voltage".to_string(), json!("18V"));
    let id = masters.save(&drill).await.unwrap();

    let by_sku = masters.find_by_sku("M-100").await.unwrap().unwrap();
    assert_eq!(by_sku.id, Some(id));
    assert_eq!(by_sku.specs.get("voltage"), Some(&json!("18V")));

    let by_upc = masters.find_by_upc("012345678905").await.unwrap().unwrap();
    assert_eq!(by_upc.id, Some(id));

    let by_mpn = masters.find_by_mpn("Makita", "XFD131").await.unwrap().unwrap();
    assert_eq!(by_mpn.id, Some(id));
    assert!(masters.find_by_mpn("Bosch", "XFD131").await.unwrap().is_none());

    assert_eq!(masters.find_by_name("drill").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_master_product_sku_is_unique_but_null_allowed() {
    let (_dir, store) = create_test_store().await;
    let masters = store.master_products();

    let mut first = MasterProduct::new("First");
    first.sku = Some("DUP".to_string());
    masters.save(&first).await.unwrap();

    let mut second = MasterProduct::new("Second");
    second.sku = Some("DUP".to_string());
    let result = masters.save(&second).await;
    assert!(matches!(
        result,
        Err(RepositoryError::UniqueConstraintViolation(_))
    ));

    // 无 SKU 的主商品可以有多个
    masters.save(&MasterProduct::new("No sku 1")).await.unwrap();
    masters.save(&MasterProduct::new("No sku 2")).await.unwrap();
    assert_eq!(masters.find_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_blank_master_skus_are_stored_as_null() {
    let (_dir, store) = create_test_store().await;
    let masters = store.master_products();

    let mut first = MasterProduct::new("Blank one");
    first.sku = Some(String::new());
    first.upc = Some("  ".to_string());
    let first_id = masters.save(&first).await.unwrap();

    let mut second = MasterProduct::new("Blank two");
    second.sku = Some(String::new());
    let second_id = masters.save(&second).await.unwrap();

    let mut third = MasterProduct::new("Blank three");
    third.sku = Some("   ".to_string());
    masters.save(&third).await.unwrap();

    let loaded = masters.find_by_id(first_id).await.unwrap().unwrap();
    assert_eq!(loaded.sku, None);
    assert_eq!(loaded.upc, None);
    assert!(masters.find_by_sku("").await.unwrap().is_none());

    // 更新为空白同样置空
    let mut keyed = masters.find_by_id(second_id).await.unwrap().unwrap();
    keyed.sku = Some("K-1".to_string());
    masters.update(&keyed).await.unwrap();
    keyed.sku = Some(" ".to_string());
    masters.update(&keyed).await.unwrap();
    assert_eq!(masters.find_by_id(second_id).await.unwrap().unwrap().sku, None);
    assert_eq!(masters.find_all().await.unwrap().len(), 3);
}

// ==========================================
// 供应商商品
// ==========================================

#[tokio::test]
async fn test_vendor_product_unique_per_vendor() {
    let (_dir, store) = create_test_store().await;
    let acme = create_vendor(store.as_ref(), "Acme").await;
    let globex = create_vendor(store.as_ref(), "Globex").await;
    let products = store.vendor_products();

    products.save(&VendorProduct::new(acme, "SKU-1")).await.unwrap();
    // 不同供应商可以使用相同的 SKU
    products.save(&VendorProduct::new(globex, "SKU-1")).await.unwrap();

    let duplicate = products.save(&VendorProduct::new(acme, "SKU-1")).await;
    assert!(matches!(
        duplicate,
        Err(RepositoryError::UniqueConstraintViolation(_))
    ));

    assert_eq!(products.count_by_vendor(acme).await.unwrap(), 1);
    assert_eq!(products.count_by_vendor(globex).await.unwrap(), 1);
}

#[tokio::test]
async fn test_vendor_product_fields_roundtrip_and_master_link() {
    let (_dir, store) = create_test_store().await;
    let vendor_id = create_vendor(store.as_ref(), "Acme").await;
    let master_id = store
        .master_products()
        .save(&MasterProduct::new("Hammer"))
        .await
        .unwrap();

    let mut offer = VendorProduct::new(vendor_id, "H-1");
    offer.vendor_price = Some(4.25);
    offer.map_price = Some(9.99);
    offer.quantity = 10;
    offer.quantity_fl = 4;
    offer.eta_nj = Some("2026-11-01".to_string());
    offer.shipping_weight = Some(1.2);
    offer.props.insert("name".to_string(), json!("Claw Hammer"));
    offer.master_product_id = Some(master_id);
    let id = store.vendor_products().save(&offer).await.unwrap();

    let loaded = store.vendor_products().find_by_id(id).await.unwrap().unwrap();
    assert_eq!(loaded.vendor_price, Some(4.25));
    assert_eq!(loaded.map_price, Some(9.99));
    assert_eq!(loaded.quantity, 10);
    assert_eq!(loaded.quantity_fl, 4);
    assert_eq!(loaded.eta_nj.as_deref(), Some("2026-11-01"));
    assert_eq!(loaded.props.get("name"), Some(&json!("Claw Hammer")));

    let offers = store
        .vendor_products()
        .find_by_master_product(master_id)
        .await
        .unwrap();
    assert_eq!(offers.len(), 1);

    // 删除主商品后报价保留，关联置空
    store.master_products().delete(master_id).await.unwrap();
    let unlinked = store.vendor_products().find_by_id(id).await.unwrap().unwrap();
    assert_eq!(unlinked.master_product_id, None);
}

#[tokio::test]
async fn test_find_by_vendor_skus_and_upsert_many() {
    let (_dir, store) = create_test_store().await;
    let vendor_id = create_vendor(store.as_ref(), "Acme").await;
    let products = store.vendor_products();

    let mut existing = VendorProduct::new(vendor_id, "U-1");
    existing.quantity = 1;
    let existing_id = products.save(&existing).await.unwrap();

    let mut updated = products.find_by_id(existing_id).await.unwrap().unwrap();
    updated.quantity = 50;
    let mut fresh = VendorProduct::new(vendor_id, "U-2");
    fresh.vendor_price = Some(2.5);

    let written = products.upsert_many(&[updated, fresh]).await.unwrap();
    assert_eq!(written, 2);

    let found = products
        .find_by_vendor_skus(
            vendor_id,
            &["U-1".to_string(), "U-2".to_string(), "U-3".to_string()],
        )
        .await
        .unwrap();
    assert_eq!(found.len(), 2);

    let u1 = found.iter().find(|p| p.vendor_sku == "U-1").unwrap();
    assert_eq!(u1.id, Some(existing_id));
    assert_eq!(u1.quantity, 50);

    assert_eq!(products.upsert_many(&[]).await.unwrap(), 0);
    assert!(products
        .find_by_vendor_skus(vendor_id, &[])
        .await
        .unwrap()
        .is_empty());
}

// ==========================================
// 连接
// ==========================================

#[tokio::test]
async fn test_connection_crud() {
    let (_dir, store) = create_test_store().await;
    let vendor_id = create_vendor(store.as_ref(), "Acme").await;
    let connections = store.connections();

    let mut conn = VendorConnection::new(vendor_id, "Nightly feed", ConnectionType::Sftp);
    conn.config.insert("host".to_string(), json!("sftp.acme.test"));
    conn.config.insert("port".to_string(), json!(2222));
    let id = connections.save(&conn).await.unwrap();

    let mut loaded = connections.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(loaded.conn_type, ConnectionType::Sftp);
    assert_eq!(loaded.config.get("port"), Some(&json!(2222)));

    loaded.conn_type = ConnectionType::Api;
    loaded.config.insert("url".to_string(), json!("https://acme.test/feed"));
    connections.update(&loaded).await.unwrap();

    let by_vendor = connections.find_by_vendor(vendor_id).await.unwrap();
    assert_eq!(by_vendor.len(), 1);
    assert_eq!(by_vendor[0].conn_type, ConnectionType::Api);
    assert_eq!(connections.find_by_name("nightly").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_vendor_delete_cascades() {
    let (_dir, store) = create_test_store().await;
    let vendor_id = create_vendor(store.as_ref(), "Acme").await;

    store
        .vendor_products()
        .save(&VendorProduct::new(vendor_id, "C-1"))
        .await
        .unwrap();
    store
        .connections()
        .save(&VendorConnection::new(vendor_id, "feed", ConnectionType::Edi))
        .await
        .unwrap();

    assert!(store.vendors().delete(vendor_id).await.unwrap());
    assert_eq!(store.vendor_products().count_by_vendor(vendor_id).await.unwrap(), 0);
    assert!(store.connections().find_by_vendor(vendor_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_vendor_product_requires_existing_vendor() {
    let (_dir, store) = create_test_store().await;

    let result = store
        .vendor_products()
        .save(&VendorProduct::new(12345, "ORPHAN"))
        .await;
    assert!(matches!(result, Err(RepositoryError::ForeignKeyViolation(_))));
}
