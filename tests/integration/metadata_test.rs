//! Metadata value endpoint tests.

use std::sync::Arc;

use metacat::warehouse::{MockExecutor, RowSet};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::common::spawn_app;

#[tokio::test]
async fn test_upsert_replaces_each_attribute() {
    let executor = Arc::new(MockExecutor::new());
    let base = spawn_app(executor.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/metadata"))
        .json(&json!({
            "level": "table",
            "catalog": "sales",
            "schema": "finance",
            "table": "orders",
            "attributes": {"Owner": "alice", "Steward": "bob"},
            "updated_by": "alice@example.com"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let executed = executor.executed();
    let sql = executor.executed_sql();
    assert_eq!(sql.len(), 4);
    assert!(sql[0].starts_with("DELETE"));
    assert!(sql[1].starts_with("INSERT"));
    assert!(sql[2].starts_with("DELETE"));
    assert!(sql[3].starts_with("INSERT"));

    // Both statements address the full path of the node.
    assert_eq!(executed[0].param("level"), Some("table"));
    assert_eq!(executed[0].param("catalog_name"), Some("sales"));
    assert_eq!(executed[0].param("schema_name"), Some("finance"));
    assert_eq!(executed[0].param("table_name"), Some("orders"));
    assert_eq!(executed[0].param("attribute_type"), Some("Owner"));

    // The insert stamps the author and lets the warehouse stamp the time.
    assert!(sql[1].contains("current_timestamp()"));
    assert_eq!(executed[1].param("attribute_value"), Some("alice"));
    assert_eq!(executed[1].param("created_by"), Some("alice@example.com"));
    assert_eq!(executed[3].param("attribute_type"), Some("Steward"));
}

#[tokio::test]
async fn test_upsert_requires_attributes() {
    let base = spawn_app(Arc::new(MockExecutor::new())).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/metadata"))
        .json(&json!({
            "level": "catalog",
            "catalog": "sales",
            "attributes": {}
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upsert_rejects_incomplete_path() {
    let base = spawn_app(Arc::new(MockExecutor::new())).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/metadata"))
        .json(&json!({
            "level": "table",
            "catalog": "sales",
            "attributes": {"Owner": "alice"}
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("schema segment"));
}

#[tokio::test]
async fn test_read_values_latest_created_at_wins() {
    let executor = Arc::new(MockExecutor::new().with_result(
        "ORDER BY created_at DESC",
        RowSet::new(
            vec![
                "attribute_type".to_string(),
                "attribute_value".to_string(),
                "created_by".to_string(),
                "created_at".to_string(),
            ],
            vec![
                vec![json!("Owner"), json!("alice"), json!("u1"), json!("2026-02-01")],
                vec![json!("Owner"), json!("bob"), json!("u2"), json!("2026-01-01")],
            ],
        ),
    ));
    let base = spawn_app(executor).await;

    let values: Vec<Value> = reqwest::Client::new()
        .get(format!("{base}/api/metadata"))
        .query(&[("level", "catalog"), ("catalog", "sales")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(values.len(), 1);
    assert_eq!(values[0]["attribute_type"], "Owner");
    assert_eq!(values[0]["attribute_value"], "alice");
}

#[tokio::test]
async fn test_metadata_attributes_filtered_by_level() {
    let executor = Arc::new(MockExecutor::new().with_result(
        "WHERE entity_type = :entity_type",
        RowSet::single_column("attribute_type", &["Owner", "Retention"]),
    ));
    let base = spawn_app(executor.clone()).await;

    let types: Vec<String> = reqwest::Client::new()
        .get(format!("{base}/api/metadata/attributes"))
        .query(&[("level", "table")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(types, vec!["Owner", "Retention"]);
    assert_eq!(executor.executed()[0].param("entity_type"), Some("table"));
}

#[tokio::test]
async fn test_bootstrap_returns_types_current_and_suggestions() {
    let executor = Arc::new(
        MockExecutor::new()
            .with_result(
                "WHERE entity_type = :entity_type",
                RowSet::single_column("attribute_type", &["Owner", "Steward"]),
            )
            .with_result(
                "ORDER BY created_at DESC",
                RowSet::new(
                    vec![
                        "attribute_type".to_string(),
                        "attribute_value".to_string(),
                        "created_by".to_string(),
                        "created_at".to_string(),
                    ],
                    vec![vec![
                        json!("Owner"),
                        json!("alice"),
                        json!("u1"),
                        json!("2026-02-01"),
                    ]],
                ),
            )
            .with_result(
                "SELECT DISTINCT attribute_type, attribute_value",
                RowSet::new(
                    vec!["attribute_type".to_string(), "attribute_value".to_string()],
                    vec![
                        vec![json!("Owner"), json!("carol")],
                        vec![json!("Owner"), json!("alice")],
                        vec![json!("Owner"), json!("carol")],
                    ],
                ),
            ),
    );
    let base = spawn_app(executor).await;

    let body: Value = reqwest::Client::new()
        .post(format!("{base}/api/metadata/bootstrap"))
        .json(&json!({"level": "catalog", "catalog": "sales"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["attribute_types"], json!(["Owner", "Steward"]));
    assert_eq!(body["current"], json!({"Owner": "alice"}));
    assert_eq!(body["suggestions"], json!({"Owner": ["alice", "carol"]}));
}

#[tokio::test]
async fn test_delete_values_issues_one_statement() {
    let executor = Arc::new(MockExecutor::new());
    let base = spawn_app(executor.clone()).await;

    let response = reqwest::Client::new()
        .delete(format!("{base}/api/metadata"))
        .json(&json!({"level": "schema", "catalog": "sales", "schema": "finance"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let sql = executor.executed_sql();
    assert_eq!(sql.len(), 1);
    assert!(sql[0].starts_with("DELETE"));
    assert_eq!(executor.executed()[0].param("schema_name"), Some("finance"));
}
