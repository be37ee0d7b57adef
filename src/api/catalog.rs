//! Hierarchy listing endpoints.
//!
//! Serve the cascading selectors of the client: distinct identifiers per
//! level, optionally scoped to the segments above.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::{ApiResult, AppState, INSTANCE_TABLE};
use crate::hierarchy::Level;
use crate::warehouse::Statement;

#[derive(Debug, Deserialize)]
pub struct LevelQuery {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct ScopeQuery {
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
}

/// Lists the distinct identifiers recorded at one level for `GET /api/entities?level=`.
pub async fn list_entities(
    State(state): State<AppState>,
    Query(query): Query<LevelQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let level = Level::parse_required(&query.level)?;
    let column = level.column_name();

    let rows = state
        .executor
        .execute(Statement::new(format!(
            "SELECT DISTINCT {column} FROM {INSTANCE_TABLE} ORDER BY {column}"
        )))
        .await?;
    Ok(Json(rows.distinct_strings(column)))
}

/// Lists every catalog that carries metadata for `GET /api/catalogs`.
pub async fn list_catalogs(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    distinct_scoped(&state, Level::Catalog, &[]).await
}

/// Lists the schemas under one catalog for `GET /api/schemas?catalog=`.
pub async fn list_schemas(
    State(state): State<AppState>,
    Query(scope): Query<ScopeQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let catalog = required(&scope.catalog, "catalog")?;
    distinct_scoped(&state, Level::Schema, &[(Level::Catalog, catalog)]).await
}

/// Lists the tables under one schema for `GET /api/tables?catalog=&schema=`.
pub async fn list_tables(
    State(state): State<AppState>,
    Query(scope): Query<ScopeQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let catalog = required(&scope.catalog, "catalog")?;
    let schema = required(&scope.schema, "schema")?;
    distinct_scoped(
        &state,
        Level::Table,
        &[(Level::Catalog, catalog), (Level::Schema, schema)],
    )
    .await
}

/// Lists the columns under one table for `GET /api/columns?catalog=&schema=&table=`.
pub async fn list_columns(
    State(state): State<AppState>,
    Query(scope): Query<ScopeQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let catalog = required(&scope.catalog, "catalog")?;
    let schema = required(&scope.schema, "schema")?;
    let table = required(&scope.table, "table")?;
    distinct_scoped(
        &state,
        Level::Column,
        &[
            (Level::Catalog, catalog),
            (Level::Schema, schema),
            (Level::Table, table),
        ],
    )
    .await
}

fn required<'a>(value: &'a Option<String>, name: &str) -> ApiResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(crate::error::MetacatError::invalid_request(format!("{name} is required")).into()),
    }
}

/// Distinct identifiers for one level, filtered by the enclosing segments.
async fn distinct_scoped(
    state: &AppState,
    level: Level,
    scope: &[(Level, &str)],
) -> ApiResult<Json<Vec<String>>> {
    let column = level.column_name();
    let mut sql = format!(
        "SELECT DISTINCT {column} FROM {INSTANCE_TABLE} WHERE {column} IS NOT NULL"
    );
    for (scope_level, _) in scope {
        let scope_column = scope_level.column_name();
        sql.push_str(&format!(" AND {scope_column} = :{scope_column}"));
    }
    sql.push_str(&format!(" ORDER BY {column}"));

    let mut statement = Statement::new(sql);
    for (scope_level, value) in scope {
        statement = statement.bind(scope_level.column_name(), *value);
    }

    let rows = state.executor.execute(statement).await?;
    Ok(Json(rows.distinct_strings(column)))
}
