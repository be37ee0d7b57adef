//! Warehouse access layer.
//!
//! Provides a trait-based interface for executing parameterized SQL against
//! the remote warehouse, with an HTTP statement client for production and a
//! scriptable mock for tests.

mod client;
mod mock;
pub mod normalize;
mod types;

pub use client::{
    HttpStatementApi, StatementApi, StatementClient, WarehouseConfig, DEFAULT_MAX_POLLS,
    DEFAULT_POLL_INTERVAL,
};
pub use mock::{FailingExecutor, MockExecutor};
pub use types::{
    ManifestColumn, ManifestSchema, ParamBinding, ResultData, ResultManifest, RowSet, Statement,
    StatementError, StatementRequest, StatementResponse, StatementState, StatementStatus,
};

use crate::error::Result;
use async_trait::async_trait;

/// Trait defining the interface for statement execution.
///
/// Implementations are stateless between invocations; each call maps to one
/// remote statement.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Executes one parameterized statement and returns the decoded rows.
    async fn execute(&self, statement: Statement) -> Result<RowSet>;
}
