//! Warehouse statement client.
//!
//! Implements the asynchronous submit/poll contract of the warehouse SQL
//! statement API: submit a parameterized statement, then poll its status on a
//! fixed interval until it reaches a terminal state or the attempt ceiling.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::config::Settings;
use crate::error::{MetacatError, Result};
use crate::warehouse::types::{RowSet, Statement, StatementRequest, StatementResponse, StatementState};
use crate::warehouse::SqlExecutor;

/// Default timeout for individual HTTP requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Statement API path on the warehouse host.
const STATEMENTS_PATH: &str = "/api/2.0/sql/statements";

/// Server-side wait before the submission returns a non-terminal state.
const DEFAULT_WAIT_TIMEOUT: &str = "15s";

/// Spacing between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Status polls issued before giving up on a statement.
pub const DEFAULT_MAX_POLLS: u32 = 60;

/// Warehouse client configuration.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Warehouse hostname, without scheme.
    pub host: String,
    /// Bearer token for the statement API.
    pub token: String,
    /// Identifier of the SQL warehouse executing statements.
    pub warehouse_id: String,
    /// Default catalog applied to every statement.
    pub catalog: String,
    /// Default schema applied to every statement.
    pub schema: String,
    /// Server-side wait passed on submission.
    pub wait_timeout: String,
    /// Spacing between status polls.
    pub poll_interval: Duration,
    /// Poll ceiling before a statement times out.
    pub max_polls: u32,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl WarehouseConfig {
    /// Creates a new config with default pacing.
    pub fn new(
        host: impl Into<String>,
        token: impl Into<String>,
        warehouse_id: impl Into<String>,
        catalog: impl Into<String>,
        schema: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            token: token.into(),
            warehouse_id: warehouse_id.into(),
            catalog: catalog.into(),
            schema: schema.into(),
            wait_timeout: DEFAULT_WAIT_TIMEOUT.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Creates a config from loaded service settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.warehouse_host.clone(),
            settings.warehouse_token.clone(),
            settings.warehouse_id.clone(),
            settings.catalog.clone(),
            settings.schema.clone(),
        )
    }

    /// Sets the poll spacing.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the poll ceiling.
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// Sets the HTTP request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Raw statement API: submission and status fetch.
///
/// Kept behind a trait so the poll loop can be driven by a scripted
/// implementation in tests.
#[async_trait]
pub trait StatementApi: Send + Sync {
    /// Submits a statement for execution.
    async fn submit(&self, request: &StatementRequest) -> Result<StatementResponse>;

    /// Fetches the current status of a submitted statement.
    async fn status(&self, statement_id: &str) -> Result<StatementResponse>;
}

/// HTTP implementation of the statement API.
pub struct HttpStatementApi {
    base_url: String,
    token: String,
    client: Client,
}

impl HttpStatementApi {
    /// Creates an HTTP statement API client for the configured warehouse.
    pub fn new(config: &WarehouseConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MetacatError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: format!("https://{}{}", config.host, STATEMENTS_PATH),
            token: config.token.clone(),
            client,
        })
    }

    /// Maps a reqwest failure to a transport error.
    fn request_error(e: reqwest::Error) -> MetacatError {
        if e.is_timeout() {
            MetacatError::transport("Warehouse request timed out")
        } else if e.is_connect() {
            MetacatError::transport("Failed to connect to the warehouse")
        } else {
            MetacatError::transport(format!("Warehouse request failed: {}", e))
        }
    }

    /// Decodes a response body, mapping non-2xx without a statement body to a
    /// transport error.
    async fn decode(response: reqwest::Response) -> Result<StatementResponse> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MetacatError::transport(format!("Failed to read response: {}", e)))?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                MetacatError::transport(format!("Failed to decode statement response: {}", e))
            });
        }

        // A non-2xx may still carry a decodable status body with the remote error.
        match serde_json::from_str::<StatementResponse>(&body) {
            Ok(decoded) if decoded.status.is_some() => Ok(decoded),
            _ => Err(MetacatError::transport(format!(
                "Warehouse returned {}: {}",
                status, body
            ))),
        }
    }
}

#[async_trait]
impl StatementApi for HttpStatementApi {
    async fn submit(&self, request: &StatementRequest) -> Result<StatementResponse> {
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await
            .map_err(Self::request_error)?;

        Self::decode(response).await
    }

    async fn status(&self, statement_id: &str) -> Result<StatementResponse> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, statement_id))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(Self::request_error)?;

        Self::decode(response).await
    }
}

/// Executes statements against the warehouse, bridging the asynchronous
/// submit/poll contract to a synchronous-looking caller contract.
pub struct StatementClient {
    api: Box<dyn StatementApi>,
    config: WarehouseConfig,
}

impl StatementClient {
    /// Creates a client talking HTTP to the configured warehouse.
    pub fn new(config: WarehouseConfig) -> Result<Self> {
        let api = Box::new(HttpStatementApi::new(&config)?);
        Ok(Self { api, config })
    }

    /// Creates a client over a caller-supplied statement API.
    pub fn with_api(config: WarehouseConfig, api: Box<dyn StatementApi>) -> Self {
        Self { api, config }
    }

    fn build_request(&self, statement: &Statement) -> StatementRequest {
        StatementRequest {
            warehouse_id: self.config.warehouse_id.clone(),
            catalog: self.config.catalog.clone(),
            schema: self.config.schema.clone(),
            statement: statement.sql.clone(),
            parameters: statement.params.clone(),
            disposition: "INLINE".to_string(),
            format: "JSON_ARRAY".to_string(),
            wait_timeout: self.config.wait_timeout.clone(),
            on_wait_timeout: "CONTINUE".to_string(),
        }
    }

    /// Maps a terminal response to rows or an error; None for in-flight states.
    fn terminal_outcome(response: &StatementResponse) -> Option<Result<RowSet>> {
        match response.state() {
            Some(StatementState::Succeeded) => Some(Ok(RowSet::from_inline(
                response.manifest.as_ref(),
                response.result.as_ref(),
            ))),
            Some(StatementState::Failed) => Some(Err(MetacatError::statement_failed(
                response.error_message("Statement failed"),
            ))),
            Some(StatementState::Canceled) => Some(Err(MetacatError::statement_canceled(
                response.error_message("Statement canceled"),
            ))),
            Some(state) if state.is_in_flight() => None,
            Some(state) => Some(Err(MetacatError::internal(format!(
                "unexpected statement state: {:?}",
                state
            )))),
            None => Some(Err(MetacatError::transport(
                "statement response carried no status",
            ))),
        }
    }

    /// Polls a submitted statement until it reaches a terminal state or the
    /// attempt ceiling is hit.
    async fn wait_for_result(&self, statement_id: &str) -> Result<RowSet> {
        for attempt in 1..=self.config.max_polls {
            tokio::time::sleep(self.config.poll_interval).await;

            let response = self.api.status(statement_id).await?;
            trace!(statement_id, attempt, state = ?response.state(), "statement poll");

            if let Some(outcome) = Self::terminal_outcome(&response) {
                return outcome;
            }
        }

        warn!(statement_id, polls = self.config.max_polls, "statement poll ceiling reached");
        Err(MetacatError::statement_timeout(format!(
            "no terminal state after {} polls",
            self.config.max_polls
        )))
    }
}

#[async_trait]
impl SqlExecutor for StatementClient {
    async fn execute(&self, statement: Statement) -> Result<RowSet> {
        let request = self.build_request(&statement);
        debug!(sql = %statement.sql, params = statement.params.len(), "submitting statement");

        let response = self.api.submit(&request).await?;

        if let Some(outcome) = Self::terminal_outcome(&response) {
            return outcome;
        }

        let statement_id = response.statement_id.clone().ok_or_else(|| {
            MetacatError::internal("in-flight statement response carried no statement_id")
        })?;
        self.wait_for_result(&statement_id).await
    }
}
