// ==========================================
// ApiReader 集成测试（wiremock 模拟 HTTP 服务）
// ==========================================

mod test_helpers;

use serde_json::json;
use vendor_catalog::config::{ApiAuth, ApiImportConfig};
use vendor_catalog::importer::{ApiReader, CatalogImporter, ImportError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use test_helpers::{create_test_store, create_vendor};

#[tokio::test]
async fn test_two_pages_are_fetched_and_concatenated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("page_size", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"sku": "P1", "name": "One"}, {"sku": "P2", "name": "Two"}],
            "links": {"next": "/products?page=2"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"sku": "P3", "name": "Three", "price": 3.5}],
            "links": {"next": null}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ApiImportConfig::new(format!("{}/products", server.uri()))
        .with_items_path("data")
        .with_param("page_size", "2")
        .with_pagination("links.next");

    let records = ApiReader::new().fetch(&config).await.unwrap();

    let skus: Vec<&str> = records.iter().map(|r| r["sku"].as_str()).collect();
    assert_eq!(skus, vec!["P1", "P2", "P3"]);
    assert_eq!(records[2]["price"], "3.5");
}

#[tokio::test]
async fn test_bearer_and_static_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(header("Authorization", "Bearer t0k"))
        .and(header("X-Client", "catalog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"sku": "A"}])))
        .expect(1)
        .mount(&server)
        .await;

    let config = ApiImportConfig::new(format!("{}/feed", server.uri()))
        .with_auth(ApiAuth::Bearer {
            token: "t0k".to_string(),
        })
        .with_header("X-Client", "catalog");

    let records = ApiReader::new().fetch(&config).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_basic_auth_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("Authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sku": "ONLY"})))
        .mount(&server)
        .await;

    let config = ApiImportConfig::new(server.uri()).with_auth(ApiAuth::Basic {
        username: "user".to_string(),
        password: "pass".to_string(),
    });

    let records = ApiReader::new().fetch(&config).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["sku"], "ONLY");
}

#[tokio::test]
async fn test_unauthorized_is_authentication_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = ApiReader::new().fetch(&ApiImportConfig::new(server.uri())).await;
    assert!(matches!(result, Err(ImportError::AuthenticationFailed(_))));
}

#[tokio::test]
async fn test_server_error_and_non_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let reader = ApiReader::new();
    let broken = reader
        .fetch(&ApiImportConfig::new(format!("{}/broken", server.uri())))
        .await;
    assert!(matches!(broken, Err(ImportError::TransportError(msg)) if msg.contains("500")));

    let html = reader
        .fetch(&ApiImportConfig::new(format!("{}/html", server.uri())))
        .await;
    assert!(matches!(html, Err(ImportError::MalformedPayload(_))));
}

#[tokio::test]
async fn test_self_referencing_next_link_stops() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"sku": "L1"}],
            "next": "/loop"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ApiImportConfig::new(format!("{}/loop", server.uri()))
        .with_items_path("items")
        .with_pagination("next");

    let records = ApiReader::new().fetch(&config).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_import_from_api_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"products": [
                {"item_number": "E1", "product_name": "Api One", "wholesale_price": "12.00"},
                {"item_number": "E2"}
            ]}
        })))
        .mount(&server)
        .await;

    let (_dir, store) = create_test_store().await;
    let vendor_id = create_vendor(store.as_ref(), "Api Vendor").await;
    let config = ApiImportConfig::new(format!("{}/catalog", server.uri()))
        .with_items_path("result.products");

    let outcome = CatalogImporter::new(store.clone())
        .import_from_api(&config, vendor_id, None)
        .await;

    assert_eq!(outcome.imported, 1);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("记录 #2"));

    let e1 = store
        .vendor_products()
        .find_by_vendor_sku(vendor_id, "E1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(e1.vendor_price, Some(12.0));
}

#[tokio::test]
async fn test_import_from_api_failure_is_single_error() {
    let (_dir, store) = create_test_store().await;
    let vendor_id = create_vendor(store.as_ref(), "Api Vendor").await;

    let outcome = CatalogImporter::new(store.clone())
        .import_from_api(&ApiImportConfig::new("not a url"), vendor_id, None)
        .await;

    assert_eq!(outcome.imported, 0);
    assert_eq!(outcome.errors.len(), 1);
}
