//! Integration tests for the catalog search API.

use axum::http::{HeaderValue, StatusCode};
use axum_test::TestServer;
use chemcat_catalog::backends::sqlite::SqliteBackend;
use chemcat_rest::extractors::{X_ENTITY_IDS, X_PERMISSIONS, X_PERSON_ID, X_SESSION_ID};
use chemcat_rest::{ServerConfig, create_app_with_config};
use serde_json::Value;

const SEED: &str = "
INSERT INTO entity (id, role) VALUES (1, 'lab'), (2, 'lab');
INSERT INTO store_location (id, label, entity, parent) VALUES
    (10, 'Room A', 1, NULL), (11, 'Shelf A1', 1, 10), (20, 'Room B', 2, NULL);
INSERT INTO name (id, label, label_nost) VALUES
    (1, 'ACETONE', 'ACETONE'), (2, 'BENZENE', 'BENZENE'), (3, 'TOLUENE', 'TOLUENE');
INSERT INTO product (id, name, restricted_access) VALUES (1, 1, 0), (2, 2, 0), (3, 3, 1);
INSERT INTO storage (id, product, store_location, barecode) VALUES
    (100, 1, 10, 'A-100'), (101, 1, 11, 'A-101'), (102, 2, 20, 'B-102');
";

fn create_test_server() -> TestServer {
    let backend = SqliteBackend::in_memory().expect("Failed to create SQLite backend");
    backend.init_schema().expect("Failed to init schema");
    backend.execute_batch(SEED).expect("Failed to seed catalog");

    let app = create_app_with_config(backend, ServerConfig::for_testing());
    TestServer::new(app).expect("Failed to create test server")
}

fn header(value: &'static str) -> HeaderValue {
    HeaderValue::from_static(value)
}

fn member(request: axum_test::TestRequest) -> axum_test::TestRequest {
    request
        .add_header(X_PERSON_ID, header("7"))
        .add_header(X_ENTITY_IDS, header("1"))
        .add_header(X_PERMISSIONS, header("select_sc,read_sc"))
}

fn labels(body: &Value) -> Vec<&str> {
    body["rows"]
        .as_array()
        .expect("rows array")
        .iter()
        .map(|row| row["name.label_nost"].as_str().unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "sqlite");
}

#[tokio::test]
async fn test_get_search_returns_page() {
    let server = create_test_server();

    let response = member(server.get("/products/search")).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total"], 2);
    assert_eq!(body["page"], 0);
    assert_eq!(body["display_by"], "product");
    assert_eq!(body["label"], "all products");
    assert_eq!(labels(&body), vec!["ACETONE", "BENZENE"]);
}

#[tokio::test]
async fn test_restricted_visible_with_read_rpc() {
    let server = create_test_server();

    let response = server
        .get("/products/search")
        .add_header(X_PERSON_ID, header("1"))
        .add_header(X_PERMISSIONS, header("read_rpc"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn test_list_parameters() {
    let server = create_test_server();

    let response = member(server.get("/products/search?entity[]=1&entity[]=2")).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(labels(&body), vec!["ACETONE", "BENZENE"]);

    let response = member(server.get("/products/search?entity=2")).await;
    let body: Value = response.json();
    assert_eq!(labels(&body), vec!["BENZENE"]);
}

#[tokio::test]
async fn test_post_form_search() {
    let server = create_test_server();

    let response = member(server.post("/products/_search"))
        .content_type("application/x-www-form-urlencoded")
        .bytes("name=benz&is_did_you_mean=".into())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(labels(&body), vec!["BENZENE"]);
    assert_eq!(body["label"], "name: benz");
}

#[tokio::test]
async fn test_suggestions() {
    let server = create_test_server();

    let response = member(server.get("/products/search?name=tolune")).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total"], 0);
    assert_eq!(body["suggestions"][0]["candidate"], "TOLUENE");
    assert_eq!(body["suggestions"][0]["distance"], 1);
}

#[tokio::test]
async fn test_forbidden_entity() {
    let server = create_test_server();

    let response = server
        .get("/products/search?entity=1")
        .add_header(X_PERSON_ID, header("8"))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn test_invalid_page() {
    let server = create_test_server();

    let response = member(server.get("/products/search?page=-1")).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid_criterion");
}

#[tokio::test]
async fn test_missing_person_header() {
    let server = create_test_server();

    let response = server.get("/products/search").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_paginate_uses_session() {
    let server = create_test_server();
    member(server.get("/products/search?result_per_page=1"))
        .add_header(X_SESSION_ID, header("tab-1"))
        .await
        .assert_status_ok();

    let response = member(server.get("/products/search?paginate&page=1"))
        .add_header(X_SESSION_ID, header("tab-1"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["page_size"], 1);
    assert_eq!(labels(&body), vec!["BENZENE"]);
}

#[tokio::test]
async fn test_export_csv() {
    let server = create_test_server();

    let response = member(server.get("/products/search?name=acetone&export_csv")).await;

    response.assert_status_ok();
    assert_eq!(
        response.header("content-type"),
        HeaderValue::from_static("text/csv; charset=utf-8")
    );
    let csv = response.text();
    assert!(csv.starts_with("product.name,"));
    // one line per storage plus the header
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("A-100"));
}

#[tokio::test]
async fn test_display_by_storage() {
    let server = create_test_server();

    let response =
        member(server.get("/products/search?display_by=storage&order_by=storage")).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["display_by"], "storage");
    assert_eq!(body["total"], 2);
    let ids: Vec<i64> = body["rows"]
        .as_array()
        .expect("rows array")
        .iter()
        .filter_map(|row| row["storage.id"].as_i64())
        .collect();
    assert_eq!(ids, vec![100, 101]);
}
