//! Free-text metadata search.
//!
//! Matches the search text against identifiers, attribute types, and
//! attribute values at every hierarchy level; hits carry their full path.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{ApiResult, AppState, INSTANCE_TABLE};
use crate::error::MetacatError;
use crate::hierarchy::Level;
use crate::warehouse::normalize::decode_entities;
use crate::warehouse::Statement;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub text: String,
}

/// One search hit: a metadata value and the node it is attached to.
#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub level: String,
    pub catalog: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub attribute_type: String,
    pub attribute_value: String,
}

/// Runs a case-insensitive substring search across all four levels for
/// `POST /api/metadata/search`, one statement per level, hits in hierarchy
/// order.
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<Vec<SearchHit>>> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(MetacatError::invalid_request("text is required").into());
    }
    let pattern = format!("%{}%", text.to_lowercase());

    let mut hits = Vec::new();
    for level in Level::ALL {
        let identifier = level.column_name();
        let rows = state
            .executor
            .execute(
                Statement::new(format!(
                    "SELECT catalog_name, schema_name, table_name, column_name, \
                            attribute_type, attribute_value \
                     FROM {INSTANCE_TABLE} \
                     WHERE level = :level AND (LOWER({identifier}) LIKE :pattern \
                        OR LOWER(attribute_type) LIKE :pattern \
                        OR LOWER(attribute_value) LIKE :pattern) \
                     ORDER BY catalog_name, schema_name, table_name, column_name, attribute_type"
                ))
                .bind("level", level.as_str())
                .bind("pattern", pattern.clone()),
            )
            .await?;

        for i in 0..rows.len() {
            hits.push(SearchHit {
                level: level.as_str().to_string(),
                catalog: decode_entities(&rows.get_string(i, "catalog_name")),
                schema: rows.get_optional(i, "schema_name").map(|s| decode_entities(&s)),
                table: rows.get_optional(i, "table_name").map(|s| decode_entities(&s)),
                column: rows.get_optional(i, "column_name").map(|s| decode_entities(&s)),
                attribute_type: decode_entities(&rows.get_string(i, "attribute_type")),
                attribute_value: decode_entities(&rows.get_string(i, "attribute_value")),
            });
        }
    }

    Ok(Json(hits))
}
