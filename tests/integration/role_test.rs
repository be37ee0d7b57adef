//! Identity-to-role endpoint tests.
//!
//! This endpoint never fails: every problem degrades to the default role.

use std::sync::Arc;

use metacat::warehouse::{FailingExecutor, MockExecutor, RowSet};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::common::spawn_app;

#[tokio::test]
async fn test_role_resolved_from_credential_table() {
    let executor = Arc::new(MockExecutor::new().with_result(
        "SELECT selected_role",
        RowSet::single_column("selected_role", &["admin"]),
    ));
    let base = spawn_app(executor.clone()).await;

    let body: Value = reqwest::Client::new()
        .get(format!("{base}/api/user-role"))
        .query(&[("oid", "abc-123"), ("upn", "Alice@Example.com")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({"role": "admin"}));

    let executed = executor.executed();
    assert_eq!(executed.len(), 1);
    assert!(executed[0].sql.contains("user_object_id = :oid"));
    assert!(executed[0].sql.contains("LOWER(user_upn) = :upn"));
    assert_eq!(executed[0].param("oid"), Some("abc-123"));
    assert_eq!(executed[0].param("upn"), Some("alice@example.com"));
}

#[tokio::test]
async fn test_unknown_role_string_defaults_to_viewer() {
    let executor = Arc::new(MockExecutor::new().with_result(
        "SELECT selected_role",
        RowSet::single_column("selected_role", &["superuser"]),
    ));
    let base = spawn_app(executor).await;

    let body: Value = reqwest::Client::new()
        .get(format!("{base}/api/user-role"))
        .query(&[("oid", "abc-123")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({"role": "viewer"}));
}

#[tokio::test]
async fn test_no_matching_row_defaults_to_viewer() {
    let base = spawn_app(Arc::new(MockExecutor::new())).await;

    let body: Value = reqwest::Client::new()
        .get(format!("{base}/api/user-role"))
        .query(&[("upn", "nobody@example.com")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({"role": "viewer"}));
}

#[tokio::test]
async fn test_lookup_failure_still_returns_ok_with_viewer() {
    let base = spawn_app(Arc::new(FailingExecutor::new("warehouse offline"))).await;

    let response = reqwest::Client::new()
        .get(format!("{base}/api/user-role"))
        .query(&[("oid", "abc-123")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"role": "viewer"}));
}

#[tokio::test]
async fn test_missing_identifiers_skip_the_lookup() {
    let executor = Arc::new(MockExecutor::new());
    let base = spawn_app(executor.clone()).await;

    let body: Value = reqwest::get(format!("{base}/api/user-role"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({"role": "viewer"}));
    assert!(executor.executed().is_empty());
}
