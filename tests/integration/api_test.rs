//! Configuration and listing endpoint tests.

use std::sync::Arc;

use metacat::warehouse::{MockExecutor, RowSet};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::common::spawn_app;

#[tokio::test]
async fn test_health_ok() {
    let base = spawn_app(Arc::new(MockExecutor::new())).await;

    let response = reqwest::get(format!("{base}/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn test_subjects_are_decoded_deduped_sorted() {
    let executor = Arc::new(MockExecutor::new().with_result(
        "DISTINCT subject",
        RowSet::single_column(
            "subject",
            &["Sales &amp; Marketing", "Finance", "Sales & Marketing", "Finance"],
        ),
    ));
    let base = spawn_app(executor).await;

    let subjects: Vec<String> = reqwest::get(format!("{base}/api/config/subjects"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(subjects, vec!["Finance", "Sales & Marketing"]);
}

#[tokio::test]
async fn test_attribute_types_bind_the_subject() {
    let executor = Arc::new(MockExecutor::new().with_result(
        "WHERE subject = :subject",
        RowSet::single_column("attribute_type", &["Owner", "Steward", "Owner"]),
    ));
    let base = spawn_app(executor.clone()).await;

    let types: Vec<String> = reqwest::Client::new()
        .get(format!("{base}/api/config/attribute-types"))
        .query(&[("subject", "Finance")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(types, vec!["Owner", "Steward"]);

    let executed = executor.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].param("subject"), Some("Finance"));
}

#[tokio::test]
async fn test_config_add_is_delete_then_insert_and_idempotent() {
    let executor = Arc::new(MockExecutor::new().with_result(
        "WHERE subject = :subject",
        RowSet::single_column("attribute_type", &["Owner"]),
    ));
    let base = spawn_app(executor.clone()).await;
    let client = reqwest::Client::new();

    let entry = json!({
        "entity_type": "table",
        "subject": "Finance",
        "attribute_type": "Owner"
    });

    // Submit the same entry twice.
    for _ in 0..2 {
        let response = client
            .post(format!("{base}/api/config"))
            .json(&entry)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Each submission deletes the triple before inserting it.
    let sql = executor.executed_sql();
    assert_eq!(sql.len(), 4);
    assert!(sql[0].starts_with("DELETE"));
    assert!(sql[1].starts_with("INSERT"));
    assert!(sql[2].starts_with("DELETE"));
    assert!(sql[3].starts_with("INSERT"));

    // Reading the subject's attribute types yields "Owner" exactly once.
    let types: Vec<String> = client
        .get(format!("{base}/api/config/attribute-types"))
        .query(&[("subject", "Finance")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(types, vec!["Owner"]);
}

#[tokio::test]
async fn test_config_add_rejects_unknown_level() {
    let base = spawn_app(Arc::new(MockExecutor::new())).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/config"))
        .json(&json!({
            "entity_type": "warehouse",
            "subject": "Finance",
            "attribute_type": "Owner"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("unknown level"));
}

#[tokio::test]
async fn test_config_list_entries() {
    let executor = Arc::new(MockExecutor::new().with_result(
        "SELECT entity_type, subject, attribute_type",
        RowSet::new(
            vec![
                "entity_type".to_string(),
                "subject".to_string(),
                "attribute_type".to_string(),
            ],
            vec![
                vec![json!("table"), json!("Finance"), json!("Owner")],
                vec![json!("column"), json!("Finance"), json!("Sensitivity")],
            ],
        ),
    ));
    let base = spawn_app(executor).await;

    let entries: Vec<Value> = reqwest::get(format!("{base}/api/config"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["entity_type"], "table");
    assert_eq!(entries[1]["attribute_type"], "Sensitivity");
}

#[tokio::test]
async fn test_config_delete_entry() {
    let executor = Arc::new(MockExecutor::new());
    let base = spawn_app(executor.clone()).await;

    let response = reqwest::Client::new()
        .delete(format!("{base}/api/config"))
        .json(&json!({
            "entity_type": "table",
            "subject": "Finance",
            "attribute_type": "Owner"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let sql = executor.executed_sql();
    assert_eq!(sql.len(), 1);
    assert!(sql[0].starts_with("DELETE"));
    assert_eq!(executor.executed()[0].param("attribute_type"), Some("Owner"));
}

#[tokio::test]
async fn test_entities_rejects_invalid_level() {
    let base = spawn_app(Arc::new(MockExecutor::new())).await;

    let response = reqwest::Client::new()
        .get(format!("{base}/api/entities"))
        .query(&[("level", "database")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_entities_lists_level_identifiers() {
    let executor = Arc::new(MockExecutor::new().with_result(
        "DISTINCT table_name",
        RowSet::single_column("table_name", &["orders", "customers", "orders"]),
    ));
    let base = spawn_app(executor).await;

    let tables: Vec<String> = reqwest::Client::new()
        .get(format!("{base}/api/entities"))
        .query(&[("level", "table")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(tables, vec!["customers", "orders"]);
}

#[tokio::test]
async fn test_schemas_require_catalog_scope() {
    let base = spawn_app(Arc::new(MockExecutor::new())).await;

    let response = reqwest::get(format!("{base}/api/schemas")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tables_are_scoped_to_catalog_and_schema() {
    let executor = Arc::new(MockExecutor::new().with_result(
        "DISTINCT table_name",
        RowSet::single_column("table_name", &["orders"]),
    ));
    let base = spawn_app(executor.clone()).await;

    let tables: Vec<String> = reqwest::Client::new()
        .get(format!("{base}/api/tables"))
        .query(&[("catalog", "sales"), ("schema", "finance")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(tables, vec!["orders"]);
    let executed = executor.executed();
    assert_eq!(executed[0].param("catalog_name"), Some("sales"));
    assert_eq!(executed[0].param("schema_name"), Some("finance"));
}
