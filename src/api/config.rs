//! Configuration endpoints.
//!
//! The configuration table declares which attribute types are assignable for
//! which subject at which hierarchy level.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{ApiResult, AppState, StatusResponse, CONFIG_TABLE};
use crate::error::MetacatError;
use crate::hierarchy::Level;
use crate::warehouse::Statement;

/// One configuration entry, identified by its full triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entity_type: String,
    pub subject: String,
    pub attribute_type: String,
}

impl ConfigEntry {
    /// Validates the entry: known level, no blank fields.
    fn validate(&self) -> ApiResult<()> {
        Level::parse_required(&self.entity_type)?;
        for (name, value) in [("subject", &self.subject), ("attribute_type", &self.attribute_type)]
        {
            if value.trim().is_empty() {
                return Err(MetacatError::invalid_request(format!("{name} is required")).into());
            }
        }
        Ok(())
    }

    fn bind_all(&self, statement: Statement) -> Statement {
        statement
            .bind("entity_type", self.entity_type.to_lowercase())
            .bind("subject", self.subject.clone())
            .bind("attribute_type", self.attribute_type.clone())
    }
}

#[derive(Debug, Deserialize)]
pub struct SubjectQuery {
    pub subject: String,
}

/// Returns the distinct subjects, decoded and sorted, for `GET /api/config/subjects`.
pub async fn list_subjects(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let rows = state
        .executor
        .execute(Statement::new(format!(
            "SELECT DISTINCT subject FROM {CONFIG_TABLE} ORDER BY subject"
        )))
        .await?;
    Ok(Json(rows.distinct_strings("subject")))
}

/// Returns the attribute types for one subject via `GET /api/config/attribute-types?subject=`.
pub async fn list_attribute_types(
    State(state): State<AppState>,
    Query(query): Query<SubjectQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let rows = state
        .executor
        .execute(
            Statement::new(format!(
                "SELECT attribute_type FROM {CONFIG_TABLE} \
                 WHERE subject = :subject ORDER BY attribute_type"
            ))
            .bind("subject", query.subject),
        )
        .await?;
    Ok(Json(rows.distinct_strings("attribute_type")))
}

/// Returns every configuration entry for `GET /api/config`.
pub async fn list_entries(State(state): State<AppState>) -> ApiResult<Json<Vec<ConfigEntry>>> {
    let rows = state
        .executor
        .execute(Statement::new(format!(
            "SELECT entity_type, subject, attribute_type FROM {CONFIG_TABLE} \
             ORDER BY subject, attribute_type"
        )))
        .await?;

    let entries = (0..rows.len())
        .map(|i| ConfigEntry {
            entity_type: rows.get_string(i, "entity_type"),
            subject: rows.get_string(i, "subject"),
            attribute_type: rows.get_string(i, "attribute_type"),
        })
        .collect();
    Ok(Json(entries))
}

/// Adds an entry via `POST /api/config`.
///
/// Delete-then-insert on the triple keeps repeated submissions idempotent.
pub async fn add_entry(
    State(state): State<AppState>,
    Json(entry): Json<ConfigEntry>,
) -> ApiResult<Json<StatusResponse>> {
    entry.validate()?;

    state
        .executor
        .execute(entry.bind_all(Statement::new(format!(
            "DELETE FROM {CONFIG_TABLE} \
             WHERE entity_type = :entity_type AND subject = :subject \
               AND attribute_type = :attribute_type"
        ))))
        .await?;

    state
        .executor
        .execute(entry.bind_all(Statement::new(format!(
            "INSERT INTO {CONFIG_TABLE} (entity_type, subject, attribute_type) \
             VALUES (:entity_type, :subject, :attribute_type)"
        ))))
        .await?;

    Ok(StatusResponse::ok())
}

/// Deletes an entry by its triple via `DELETE /api/config`.
pub async fn delete_entry(
    State(state): State<AppState>,
    Json(entry): Json<ConfigEntry>,
) -> ApiResult<Json<StatusResponse>> {
    entry.validate()?;

    state
        .executor
        .execute(entry.bind_all(Statement::new(format!(
            "DELETE FROM {CONFIG_TABLE} \
             WHERE entity_type = :entity_type AND subject = :subject \
               AND attribute_type = :attribute_type"
        ))))
        .await?;

    Ok(StatusResponse::ok())
}
