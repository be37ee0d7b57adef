//! Identity-to-role resolution.
//!
//! The one endpoint that never fails: any lookup problem degrades to the
//! default role so a transient identity issue cannot block page load.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{AppState, ROLES_TABLE};
use crate::hierarchy::Role;
use crate::warehouse::Statement;

#[derive(Debug, Deserialize)]
pub struct IdentityQuery {
    /// Account object identifier from the identity provider.
    #[serde(default)]
    pub oid: Option<String>,
    /// User principal name from the identity provider.
    #[serde(default)]
    pub upn: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: Role,
}

/// Resolves a signed-in identity to a role for `GET /api/user-role?oid=&upn=`.
pub async fn resolve_role(
    State(state): State<AppState>,
    Query(query): Query<IdentityQuery>,
) -> Json<RoleResponse> {
    let role = lookup_role(&state, &query).await;
    info!(role = %role, "resolved user role");
    Json(RoleResponse { role })
}

async fn lookup_role(state: &AppState, query: &IdentityQuery) -> Role {
    let oid = query.oid.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let upn = query.upn.as_deref().map(str::trim).filter(|s| !s.is_empty());

    if oid.is_none() && upn.is_none() {
        warn!("role lookup without identifiers; applying default role");
        return Role::default();
    }

    let mut clauses = Vec::new();
    let mut statement_binds: Vec<(&str, String)> = Vec::new();
    if let Some(oid) = oid {
        clauses.push("user_object_id = :oid");
        statement_binds.push(("oid", oid.to_string()));
    }
    if let Some(upn) = upn {
        clauses.push("LOWER(user_upn) = :upn");
        statement_binds.push(("upn", upn.to_lowercase()));
    }

    let mut statement = Statement::new(format!(
        "SELECT selected_role FROM {ROLES_TABLE} \
         WHERE status = 'active' AND ({}) \
         ORDER BY created_at DESC LIMIT 1",
        clauses.join(" OR ")
    ));
    for (name, value) in statement_binds {
        statement = statement.bind(name, value);
    }

    match state.executor.execute(statement).await {
        Ok(rows) => match rows.first_string("selected_role") {
            Some(raw) => Role::parse(&raw).unwrap_or_else(|| {
                warn!(role = %raw, "unknown role in credential table; applying default role");
                Role::default()
            }),
            None => {
                info!("no active role entry for identity; applying default role");
                Role::default()
            }
        },
        Err(e) => {
            warn!("role lookup failed, applying default role: {}", e);
            Role::default()
        }
    }
}
