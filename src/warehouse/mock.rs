//! Mock statement executors for testing.
//!
//! Provides scriptable in-memory implementations of [`SqlExecutor`] so route
//! handlers can be exercised without a warehouse.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{RowSet, SqlExecutor, Statement};
use crate::error::{MetacatError, Result};

/// A mock executor that returns scripted row sets matched by SQL fragment.
///
/// The first registered fragment contained in the statement text wins;
/// unmatched statements return an empty row set. Every executed statement is
/// recorded for assertion.
pub struct MockExecutor {
    responses: Mutex<Vec<(String, RowSet)>>,
    executed: Mutex<Vec<Statement>>,
}

impl MockExecutor {
    /// Creates a mock executor with no scripted responses.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Registers a row set for statements containing the given SQL fragment.
    pub fn with_result(self, fragment: impl Into<String>, rows: RowSet) -> Self {
        self.responses.lock().unwrap().push((fragment.into(), rows));
        self
    }

    /// Returns every statement executed so far.
    pub fn executed(&self) -> Vec<Statement> {
        self.executed.lock().unwrap().clone()
    }

    /// Returns the SQL text of every statement executed so far.
    pub fn executed_sql(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.sql.clone())
            .collect()
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SqlExecutor for MockExecutor {
    async fn execute(&self, statement: Statement) -> Result<RowSet> {
        let result = {
            let responses = self.responses.lock().unwrap();
            responses
                .iter()
                .find(|(fragment, _)| statement.sql.contains(fragment.as_str()))
                .map(|(_, rows)| rows.clone())
                .unwrap_or_else(RowSet::empty)
        };
        self.executed.lock().unwrap().push(statement);
        Ok(result)
    }
}

/// A mock executor that fails every statement with the given message.
pub struct FailingExecutor {
    message: String,
}

impl FailingExecutor {
    /// Creates an executor that rejects everything with a statement failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl SqlExecutor for FailingExecutor {
    async fn execute(&self, _statement: Statement) -> Result<RowSet> {
        Err(MetacatError::statement_failed(self.message.clone()))
    }
}
