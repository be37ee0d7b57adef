//! HTTP API for metacat.
//!
//! Maps REST endpoints onto statement-client calls. Handlers are thin: they
//! assemble parameterized SQL, execute it, and shape the JSON response.

mod catalog;
mod config;
mod metadata;
mod role;
mod search;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::error::MetacatError;
use crate::warehouse::SqlExecutor;

/// Configuration table: declares which attribute types are assignable where.
pub(crate) const CONFIG_TABLE: &str = "business_metadata_config";

/// Instance table: the metadata values attached to hierarchy nodes.
pub(crate) const INSTANCE_TABLE: &str = "business_metadata_instance";

/// Role credential table consulted at login.
pub(crate) const ROLES_TABLE: &str = "business_metadata_user_roles";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<dyn SqlExecutor>,
}

impl AppState {
    /// Creates state around a statement executor.
    pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
        Self { executor }
    }
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler-level error wrapper mapping domain errors to HTTP responses.
pub struct ApiError(MetacatError);

impl From<MetacatError> for ApiError {
    fn from(err: MetacatError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            MetacatError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!("{}: {}", self.0.category(), self.0);
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Plain status acknowledgement for write endpoints.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { status: "OK" })
    }
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/config/subjects", get(config::list_subjects))
        .route("/api/config/attribute-types", get(config::list_attribute_types))
        .route(
            "/api/config",
            get(config::list_entries)
                .post(config::add_entry)
                .delete(config::delete_entry),
        )
        .route("/api/entities", get(catalog::list_entities))
        .route("/api/catalogs", get(catalog::list_catalogs))
        .route("/api/schemas", get(catalog::list_schemas))
        .route("/api/tables", get(catalog::list_tables))
        .route("/api/columns", get(catalog::list_columns))
        .route("/api/metadata/attributes", get(metadata::list_attribute_types))
        .route(
            "/api/metadata",
            get(metadata::read_values)
                .post(metadata::upsert_values)
                .delete(metadata::delete_values),
        )
        .route("/api/metadata/bootstrap", post(metadata::bootstrap))
        .route("/api/metadata/search", post(search::search))
        .route("/api/user-role", get(role::resolve_role))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe.
async fn health(State(_state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}
