//! Error types for metacat.
//!
//! Defines the main error enum used throughout the service.

use thiserror::Error;

/// Main error type for metacat operations.
#[derive(Error, Debug)]
pub enum MetacatError {
    /// Network/HTTP-layer failures talking to the warehouse.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The warehouse reported the statement as failed.
    #[error("Statement failed: {0}")]
    StatementFailed(String),

    /// The warehouse reported the statement as canceled.
    #[error("Statement canceled: {0}")]
    StatementCanceled(String),

    /// The statement never reached a terminal state within the poll ceiling.
    #[error("Statement timed out: {0}")]
    StatementTimeout(String),

    /// Configuration errors (missing environment values, invalid settings).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid request input (unknown level, incomplete hierarchy path, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal service errors (unexpected states, bugs).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MetacatError {
    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a statement-failed error with the remote-supplied message.
    pub fn statement_failed(msg: impl Into<String>) -> Self {
        Self::StatementFailed(msg.into())
    }

    /// Creates a statement-canceled error with the remote-supplied message.
    pub fn statement_canceled(msg: impl Into<String>) -> Self {
        Self::StatementCanceled(msg.into())
    }

    /// Creates a statement-timeout error with the given message.
    pub fn statement_timeout(msg: impl Into<String>) -> Self {
        Self::StatementTimeout(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an invalid-request error with the given message.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) => "Transport Error",
            Self::StatementFailed(_) => "Statement Failed",
            Self::StatementCanceled(_) => "Statement Canceled",
            Self::StatementTimeout(_) => "Statement Timeout",
            Self::Config(_) => "Configuration Error",
            Self::InvalidRequest(_) => "Invalid Request",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using MetacatError.
pub type Result<T> = std::result::Result<T, MetacatError>;
