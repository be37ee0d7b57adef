//! Configuration management for metacat.
//!
//! All settings come from the environment (optionally seeded from a `.env`
//! file by `main`). Every warehouse value is required; absence of any is a
//! startup-time configuration error.

use crate::error::{MetacatError, Result};

/// Default HTTP listen port.
fn default_port() -> u16 {
    3001
}

/// Default bind address.
fn default_bind() -> String {
    "0.0.0.0".to_string()
}

/// Runtime settings for the service.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Warehouse hostname, without scheme (e.g. "adb-123.azuredatabricks.net").
    pub warehouse_host: String,

    /// Bearer token for the warehouse statement API.
    pub warehouse_token: String,

    /// Identifier of the SQL warehouse that executes statements.
    pub warehouse_id: String,

    /// Default catalog applied to every statement.
    pub catalog: String,

    /// Default schema applied to every statement.
    pub schema: String,

    /// HTTP listen port.
    pub port: u16,

    /// HTTP bind address.
    pub bind: String,
}

impl Settings {
    /// Loads settings from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::load(|key| std::env::var(key).ok())
    }

    /// Loads settings through an injectable variable lookup.
    fn load(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            match lookup(key) {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(MetacatError::config(format!("{key} is not set"))),
            }
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| MetacatError::config(format!("PORT is not a valid port: {raw}")))?,
            None => default_port(),
        };

        Ok(Self {
            warehouse_host: required("WAREHOUSE_HOST")?,
            warehouse_token: required("WAREHOUSE_TOKEN")?,
            warehouse_id: required("WAREHOUSE_ID")?,
            catalog: required("WAREHOUSE_CATALOG")?,
            schema: required("WAREHOUSE_SCHEMA")?,
            port,
            bind: lookup("BIND_ADDR").unwrap_or_else(default_bind),
        })
    }

    /// Returns a display-safe string (no token) for startup logging.
    pub fn display_string(&self) -> String {
        format!(
            "{}/{} @ {} (warehouse {})",
            self.catalog, self.schema, self.warehouse_host, self.warehouse_id
        )
    }
}
