//! Failure taxonomy for API requests.

use http::StatusCode;

/// Errors that can occur when executing an API request
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server could not be reached (DNS, timeout, offline)
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server answered with a status outside 2xx
    #[error("Server error: status {0}")]
    Server(StatusCode),

    /// A success body did not match the expected schema
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The operation was superseded before it completed
    #[error("Request cancelled")]
    Cancelled,

    /// The request can never succeed as configured (programming or config error)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Whether this is a cooperative cancellation rather than a failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// Whether this error points at a programming or configuration mistake
    pub fn is_fatal(&self) -> bool {
        matches!(self, ApiError::Configuration(_))
    }

    /// The HTTP status for server failures
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Server(status) => Some(*status),
            _ => None,
        }
    }
}
