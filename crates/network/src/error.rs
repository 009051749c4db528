// crates/network/src/error.rs
//! Error types for network operations

use thiserror::Error;

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors that can occur during network operations
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Request could not be sent or the connection failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// Response body is not the expected JSON
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl NetworkError {
    /// Returns true if the error is worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            NetworkError::Status { code, .. } => *code >= 500,
            NetworkError::Decode(_) | NetworkError::InvalidUrl(_) => false,
        }
    }

    /// Returns true if the error is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        matches!(self, NetworkError::Status { code, .. } if (400..500).contains(code))
    }

    /// Returns true if the error is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        matches!(self, NetworkError::Status { code, .. } if *code >= 500)
    }

    /// Returns the HTTP status code, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Status { code, .. } => Some(*code),
            NetworkError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
