//! Statement and result types for the warehouse layer.
//!
//! Defines the parameterized statement handed to an executor, the wire types
//! of the asynchronous statement API, and the decoded row set returned to
//! callers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::warehouse::normalize;

/// A named parameter bound to a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamBinding {
    pub name: String,
    pub value: String,
}

/// One parameterized SQL statement to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<ParamBinding>,
}

impl Statement {
    /// Creates a statement with no bound parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Binds a named parameter value.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(ParamBinding {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Returns the bound value for a parameter name, if present.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

/// Lifecycle state reported by the statement API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatementState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Closed,
}

impl StatementState {
    /// True for states that still require polling.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }
}

// Statement API wire types

/// Submission body for the statement endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StatementRequest {
    pub warehouse_id: String,
    pub catalog: String,
    pub schema: String,
    pub statement: String,
    pub parameters: Vec<ParamBinding>,
    pub disposition: String,
    pub format: String,
    pub wait_timeout: String,
    pub on_wait_timeout: String,
}

/// Response body shared by submission and status polls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatementResponse {
    #[serde(default)]
    pub statement_id: Option<String>,
    #[serde(default)]
    pub status: Option<StatementStatus>,
    #[serde(default)]
    pub manifest: Option<ResultManifest>,
    #[serde(default)]
    pub result: Option<ResultData>,
}

impl StatementResponse {
    /// The reported state, if the body carried one.
    pub fn state(&self) -> Option<StatementState> {
        self.status.as_ref().map(|s| s.state)
    }

    /// The remote error message, falling back to a state-derived default.
    pub fn error_message(&self, fallback: &str) -> String {
        self.status
            .as_ref()
            .and_then(|s| s.error.as_ref())
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatementStatus {
    pub state: StatementState,
    #[serde(default)]
    pub error: Option<StatementError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatementError {
    #[serde(default)]
    pub message: Option<String>,
}

/// Ordered column manifest for a result set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultManifest {
    #[serde(default)]
    pub schema: ManifestSchema,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestSchema {
    #[serde(default)]
    pub columns: Vec<ManifestColumn>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestColumn {
    pub name: String,
}

/// Inline result payload.
///
/// The statement API delivers rows as `data_array`; result producers have
/// been observed to use `rows`/`data` wrappers instead, so decoding falls
/// back to the normalizer for anything else.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultData {
    #[serde(default)]
    pub data_array: Option<Vec<Vec<Value>>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ResultData {
    /// Returns the rows regardless of which shape carried them.
    pub fn rows(&self) -> Vec<Vec<Value>> {
        if let Some(rows) = &self.data_array {
            return rows.clone();
        }
        normalize::normalize_rows(&Value::Object(self.extra.clone()))
            .into_iter()
            .map(|row| row.as_array().cloned().unwrap_or_default())
            .collect()
    }
}

/// A decoded result set: ordered column names plus rows of JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    /// Creates a row set from columns and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Creates an empty row set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a single-column row set of string values.
    pub fn single_column(name: &str, values: &[&str]) -> Self {
        Self {
            columns: vec![name.to_string()],
            rows: values
                .iter()
                .map(|v| vec![Value::String((*v).to_string())])
                .collect(),
        }
    }

    /// Decodes a manifest plus inline result into a row set.
    pub fn from_inline(manifest: Option<&ResultManifest>, result: Option<&ResultData>) -> Self {
        let columns = manifest
            .map(|m| m.schema.columns.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default();
        let rows = result.map(ResultData::rows).unwrap_or_default();
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Name→value records in manifest column order.
    pub fn records(&self) -> Vec<serde_json::Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned().chain(std::iter::repeat(Value::Null)))
                    .collect()
            })
            .collect()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns one cell as a JSON value.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Returns one cell rendered as a string; null and absent cells are empty.
    pub fn get_string(&self, row: usize, column: &str) -> String {
        match self.get(row, column) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Returns one cell as an optional string; null and empty cells are None.
    pub fn get_optional(&self, row: usize, column: &str) -> Option<String> {
        let s = self.get_string(row, column);
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }

    /// First row's value for a column, if any.
    pub fn first_string(&self, column: &str) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            self.get_optional(0, column)
        }
    }

    /// The defensive listing pipeline: non-empty values of one column,
    /// entity-decoded, deduplicated, sorted.
    pub fn distinct_strings(&self, column: &str) -> Vec<String> {
        let mut values: Vec<String> = (0..self.len())
            .map(|i| normalize::decode_entities(&self.get_string(i, column)))
            .filter(|s| !s.is_empty())
            .collect();
        values.sort();
        values.dedup();
        values
    }
}
