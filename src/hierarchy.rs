//! Catalog hierarchy and access-role model.
//!
//! The warehouse hierarchy has four levels (catalog, schema, table, column);
//! metadata values attach to one node addressed by a level plus the path
//! segments down to that level.

use serde::{Deserialize, Serialize};

use crate::error::{MetacatError, Result};

/// A position in the data-catalog hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Catalog,
    Schema,
    Table,
    Column,
}

impl Level {
    /// All levels, outermost first.
    pub const ALL: [Level; 4] = [Level::Catalog, Level::Schema, Level::Table, Level::Column];

    /// Returns the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Schema => "schema",
            Self::Table => "table",
            Self::Column => "column",
        }
    }

    /// Parses a level from a string, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "catalog" => Some(Self::Catalog),
            "schema" => Some(Self::Schema),
            "table" => Some(Self::Table),
            "column" => Some(Self::Column),
            _ => None,
        }
    }

    /// Like [`Level::parse`], but produces an invalid-request error for handlers.
    pub fn parse_required(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| MetacatError::invalid_request(format!("unknown level: {s}")))
    }

    /// Returns the identifier column for this level in the instance table.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Catalog => "catalog_name",
            Self::Schema => "schema_name",
            Self::Table => "table_name",
            Self::Column => "column_name",
        }
    }

    /// Hierarchy depth, catalog = 1 through column = 4.
    pub fn depth(&self) -> usize {
        match self {
            Self::Catalog => 1,
            Self::Schema => 2,
            Self::Table => 3,
            Self::Column => 4,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The path segments addressing one hierarchy node.
///
/// A path is complete for a level when every segment down to that level is
/// non-empty; segments below the level are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPath {
    pub catalog: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub column: Option<String>,
}

impl EntityPath {
    /// Builds a path from its parts, validating completeness for the level.
    pub fn from_parts(
        level: Level,
        catalog: Option<String>,
        schema: Option<String>,
        table: Option<String>,
        column: Option<String>,
    ) -> Result<Self> {
        let path = Self {
            catalog: catalog.unwrap_or_default(),
            schema,
            table,
            column,
        };
        path.validate_for(level)?;
        Ok(path)
    }

    /// Checks that every segment down to `level` is present and non-empty.
    pub fn validate_for(&self, level: Level) -> Result<()> {
        let segments = [
            Some(self.catalog.as_str()),
            self.schema.as_deref(),
            self.table.as_deref(),
            self.column.as_deref(),
        ];
        for (i, segment) in segments.into_iter().take(level.depth()).enumerate() {
            if segment.map(str::trim).unwrap_or("").is_empty() {
                return Err(MetacatError::invalid_request(format!(
                    "level '{}' requires a {} segment",
                    level,
                    Level::ALL[i]
                )));
            }
        }
        Ok(())
    }

    /// Returns the segment for one level, if set.
    pub fn segment(&self, level: Level) -> Option<&str> {
        match level {
            Level::Catalog => Some(self.catalog.as_str()),
            Level::Schema => self.schema.as_deref(),
            Level::Table => self.table.as_deref(),
            Level::Column => self.column.as_deref(),
        }
    }

    /// Dotted rendering of the populated segments, for logs.
    pub fn dotted(&self) -> String {
        let mut out = self.catalog.clone();
        for segment in [&self.schema, &self.table, &self.column].into_iter().flatten() {
            out.push('.');
            out.push_str(segment);
        }
        out
    }
}

/// Access role resolved from the role credential table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    /// Safe default: applied whenever the lookup fails or yields nothing.
    #[default]
    Viewer,
}

impl Role {
    /// Returns the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    /// Parses a role from a string, case-insensitively.
    ///
    /// Unknown strings resolve to None; callers fall back to [`Role::Viewer`].
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "editor" => Some(Self::Editor),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
