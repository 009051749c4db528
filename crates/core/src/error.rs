//! Error taxonomy for catalog operations
//!
//! Every failure that crosses the gateway boundary is one of these variants.
//! Errors are classified into three severity tiers:
//! - **Recoverable**: retrying later is likely to succeed (network down, 5xx)
//! - **Degraded**: the request itself was refused (validation, missing book)
//! - **Fatal**: the server speaks a different contract than expected
//!
//! `user_message` gives a sentence that is safe to show in the UI.

use crate::types::{BookId, FieldError};
use std::fmt;
use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Transient; the same request may succeed later
    Recoverable,
    /// The request was refused; the user has to change something
    Degraded,
    /// Contract mismatch with the remote service
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Main error type for catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Network unreachable, connection reset or timeout
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Non-success HTTP status
    #[error("Server returned HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// The server rejected a create or update payload
    #[error("Rejected by server: {message}")]
    Validation { message: String },

    /// The book does not exist on the server
    #[error("Book not found: {id}")]
    NotFound { id: BookId },

    /// The response body did not match the expected shape
    #[error("Invalid response: {details}")]
    InvalidResponse { details: String },

    /// The draft failed local validation and was never sent
    #[error("Invalid book: {}", join_fields(.0))]
    InvalidDraft(Vec<FieldError>),

    /// Another mutation is still in flight
    #[error("Another change is still being saved")]
    Busy,
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl CatalogError {
    /// Creates a transport error wrapping its cause
    pub fn transport(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a transport error without an underlying cause
    pub fn transport_message(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Transport { .. } | Self::Busy => ErrorSeverity::Recoverable,
            Self::Server { status, .. } if *status >= 500 => ErrorSeverity::Recoverable,
            Self::Server { .. }
            | Self::Validation { .. }
            | Self::NotFound { .. }
            | Self::InvalidDraft(_) => ErrorSeverity::Degraded,
            Self::InvalidResponse { .. } => ErrorSeverity::Fatal,
        }
    }

    /// Returns true if repeating the same request could succeed
    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Recoverable
    }

    /// Returns true for a missing book
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns a user-friendly error message suitable for display in the UI
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { .. } => {
                "Cannot reach the catalog server. Please check your connection.".to_string()
            }
            Self::Server { status, .. } if *status >= 500 => {
                "The catalog server is having trouble. Please try again later.".to_string()
            }
            Self::Server { status, .. } => {
                format!("The catalog server refused the request (HTTP {}).", status)
            }
            Self::Validation { message } => format!("The book was rejected: {}", message),
            Self::NotFound { .. } => "The book no longer exists.".to_string(),
            Self::InvalidResponse { .. } => {
                "Received unexpected data from the catalog server.".to_string()
            }
            Self::InvalidDraft(errors) => errors
                .iter()
                .map(|e| e.message.clone())
                .collect::<Vec<_>>()
                .join(". "),
            Self::Busy => "Please wait for the current change to finish.".to_string(),
        }
    }
}
