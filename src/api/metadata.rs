//! Metadata value endpoints.
//!
//! Reads and writes the instance table: the attribute values attached to one
//! hierarchy node. Writes replace per (level, path, attribute_type) via
//! delete-then-insert; reads resolve duplicates by letting the latest
//! `created_at` win.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::{ApiResult, AppState, StatusResponse, CONFIG_TABLE, INSTANCE_TABLE};
use crate::error::MetacatError;
use crate::hierarchy::{EntityPath, Level};
use crate::warehouse::normalize::decode_entities;
use crate::warehouse::{RowSet, Statement};

/// Per-attribute suggestion list cap in the bootstrap response.
const SUGGESTION_CAP: usize = 100;

/// Hierarchy node address, shared by query strings and request bodies.
#[derive(Debug, Deserialize)]
pub struct NodeParams {
    pub level: String,
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub column: Option<String>,
}

impl NodeParams {
    fn resolve(&self) -> ApiResult<(Level, EntityPath)> {
        let level = Level::parse_required(&self.level)?;
        let path = EntityPath::from_parts(
            level,
            self.catalog.clone(),
            self.schema.clone(),
            self.table.clone(),
            self.column.clone(),
        )?;
        Ok((level, path))
    }
}

/// Upsert body: node address plus the attribute values to write.
#[derive(Debug, Deserialize)]
pub struct UpsertRequest {
    #[serde(flatten)]
    pub node: NodeParams,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttributesQuery {
    #[serde(default)]
    pub level: Option<String>,
}

/// One current metadata value on a node.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataValue {
    pub attribute_type: String,
    pub attribute_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Bootstrap payload for the input screen.
#[derive(Debug, Serialize)]
pub struct BootstrapResponse {
    pub attribute_types: Vec<String>,
    pub current: BTreeMap<String, String>,
    pub suggestions: BTreeMap<String, Vec<String>>,
}

/// Equality filter addressing one node, with its parameter binds.
fn node_filter(level: Level, path: &EntityPath) -> (String, Vec<(&'static str, String)>) {
    let mut clauses = vec!["level = :level".to_string()];
    let mut binds: Vec<(&'static str, String)> = vec![("level", level.as_str().to_string())];
    for segment_level in Level::ALL.iter().take(level.depth()) {
        let column = segment_level.column_name();
        clauses.push(format!("{column} = :{column}"));
        binds.push((
            column,
            path.segment(*segment_level).unwrap_or_default().to_string(),
        ));
    }
    (clauses.join(" AND "), binds)
}

fn bind_all(mut statement: Statement, binds: &[(&'static str, String)]) -> Statement {
    for (name, value) in binds {
        statement = statement.bind(*name, value.clone());
    }
    statement
}

/// Current values for a node, latest `created_at` winning per attribute type.
fn latest_values(rows: &RowSet) -> Vec<MetadataValue> {
    let mut seen = BTreeSet::new();
    let mut values = Vec::new();
    for i in 0..rows.len() {
        let attribute_type = decode_entities(&rows.get_string(i, "attribute_type"));
        if attribute_type.is_empty() || !seen.insert(attribute_type.clone()) {
            continue;
        }
        values.push(MetadataValue {
            attribute_type,
            attribute_value: decode_entities(&rows.get_string(i, "attribute_value")),
            created_by: rows.get_optional(i, "created_by"),
            created_at: rows.get_optional(i, "created_at"),
        });
    }
    values
}

async fn fetch_current(
    state: &AppState,
    level: Level,
    path: &EntityPath,
) -> ApiResult<Vec<MetadataValue>> {
    let (filter, binds) = node_filter(level, path);
    let rows = state
        .executor
        .execute(bind_all(
            Statement::new(format!(
                "SELECT attribute_type, attribute_value, created_by, created_at \
                 FROM {INSTANCE_TABLE} WHERE {filter} ORDER BY created_at DESC"
            )),
            &binds,
        ))
        .await?;
    Ok(latest_values(&rows))
}

/// Returns the assignable attribute types for `GET /api/metadata/attributes?level=`.
pub async fn list_attribute_types(
    State(state): State<AppState>,
    Query(query): Query<AttributesQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let statement = match query.level.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => {
            let level = Level::parse_required(raw)?;
            Statement::new(format!(
                "SELECT DISTINCT attribute_type FROM {CONFIG_TABLE} \
                 WHERE entity_type = :entity_type ORDER BY attribute_type"
            ))
            .bind("entity_type", level.as_str())
        }
        None => Statement::new(format!(
            "SELECT DISTINCT attribute_type FROM {CONFIG_TABLE} ORDER BY attribute_type"
        )),
    };

    let rows = state.executor.execute(statement).await?;
    Ok(Json(rows.distinct_strings("attribute_type")))
}

/// Returns the current values for one node via `GET /api/metadata?level=&catalog=...`.
pub async fn read_values(
    State(state): State<AppState>,
    Query(params): Query<NodeParams>,
) -> ApiResult<Json<Vec<MetadataValue>>> {
    let (level, path) = params.resolve()?;
    let values = fetch_current(&state, level, &path).await?;
    Ok(Json(values))
}

/// Returns attribute types, current values, and suggestions for one node in a
/// single round trip, serving `POST /api/metadata/bootstrap` for the input
/// screen.
pub async fn bootstrap(
    State(state): State<AppState>,
    Json(params): Json<NodeParams>,
) -> ApiResult<Json<BootstrapResponse>> {
    let (level, path) = params.resolve()?;

    let types_rows = state
        .executor
        .execute(
            Statement::new(format!(
                "SELECT DISTINCT attribute_type FROM {CONFIG_TABLE} \
                 WHERE entity_type = :entity_type ORDER BY attribute_type"
            ))
            .bind("entity_type", level.as_str()),
        )
        .await?;
    let attribute_types = types_rows.distinct_strings("attribute_type");

    let current = fetch_current(&state, level, &path)
        .await?
        .into_iter()
        .map(|v| (v.attribute_type, v.attribute_value))
        .collect();

    let suggestion_rows = state
        .executor
        .execute(
            Statement::new(format!(
                "SELECT DISTINCT attribute_type, attribute_value FROM {INSTANCE_TABLE} \
                 WHERE level = :level"
            ))
            .bind("level", level.as_str()),
        )
        .await?;

    let mut suggestions: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for i in 0..suggestion_rows.len() {
        let attribute_type = decode_entities(&suggestion_rows.get_string(i, "attribute_type"));
        let attribute_value = decode_entities(&suggestion_rows.get_string(i, "attribute_value"));
        if attribute_type.is_empty() || attribute_value.is_empty() {
            continue;
        }
        suggestions.entry(attribute_type).or_default().push(attribute_value);
    }
    for values in suggestions.values_mut() {
        values.sort();
        values.dedup();
        values.truncate(SUGGESTION_CAP);
    }

    Ok(Json(BootstrapResponse {
        attribute_types,
        current,
        suggestions,
    }))
}

/// Upserts a value set on one node via `POST /api/metadata`.
///
/// Each attribute is replaced independently: delete the current row for the
/// (level, path, attribute_type) triplet, then insert the new value. The
/// warehouse guarantees per-statement atomicity only; there is no wrapping
/// transaction across the pair.
pub async fn upsert_values(
    State(state): State<AppState>,
    Json(request): Json<UpsertRequest>,
) -> ApiResult<Json<StatusResponse>> {
    let (level, path) = request.node.resolve()?;
    if request.attributes.is_empty() {
        return Err(MetacatError::invalid_request("attributes is required").into());
    }

    let created_by = request
        .updated_by
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("api")
        .to_string();

    let (filter, binds) = node_filter(level, &path);

    let mut insert_columns: Vec<&str> = vec!["level"];
    insert_columns.extend(Level::ALL.iter().take(level.depth()).map(Level::column_name));
    insert_columns.extend(["attribute_type", "attribute_value", "created_by"]);
    let placeholders: Vec<String> = insert_columns.iter().map(|c| format!(":{c}")).collect();
    let insert_sql = format!(
        "INSERT INTO {INSTANCE_TABLE} ({}, created_at) VALUES ({}, current_timestamp())",
        insert_columns.join(", "),
        placeholders.join(", ")
    );

    for (attribute_type, attribute_value) in &request.attributes {
        debug!(node = %path.dotted(), attribute_type = %attribute_type, "replacing metadata value");

        state
            .executor
            .execute(
                bind_all(
                    Statement::new(format!(
                        "DELETE FROM {INSTANCE_TABLE} \
                         WHERE {filter} AND attribute_type = :attribute_type"
                    )),
                    &binds,
                )
                .bind("attribute_type", attribute_type.clone()),
            )
            .await?;

        state
            .executor
            .execute(
                bind_all(Statement::new(insert_sql.clone()), &binds)
                    .bind("attribute_type", attribute_type.clone())
                    .bind("attribute_value", attribute_value.clone())
                    .bind("created_by", created_by.clone()),
            )
            .await?;
    }

    Ok(StatusResponse::ok())
}

/// Deletes every value on one node via `DELETE /api/metadata`.
pub async fn delete_values(
    State(state): State<AppState>,
    Json(params): Json<NodeParams>,
) -> ApiResult<Json<StatusResponse>> {
    let (level, path) = params.resolve()?;
    let (filter, binds) = node_filter(level, &path);

    state
        .executor
        .execute(bind_all(
            Statement::new(format!("DELETE FROM {INSTANCE_TABLE} WHERE {filter}")),
            &binds,
        ))
        .await?;

    Ok(StatusResponse::ok())
}
