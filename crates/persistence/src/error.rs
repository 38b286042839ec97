//! Table storage error types.

use thiserror::Error;

use crate::connection::ConnectionStringError;

/// Errors returned by table storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid storage connection string: {0}")]
    InvalidConnectionString(#[from] ConnectionStringError),

    #[error("Table service request timed out")]
    Timeout,

    #[error("Table service unavailable: {0}")]
    Unavailable(String),

    #[error("Entity already exists")]
    Conflict,

    #[error("Table service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to serialize entity: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to sign request: {0}")]
    Signing(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl StoreError {
    /// Whether the table service could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Timeout | StoreError::Unavailable(_))
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::InvalidConnectionString(_) => "config",
            StoreError::Timeout => "timeout",
            StoreError::Unavailable(_) => "unavailable",
            StoreError::Conflict => "conflict",
            StoreError::Rejected { .. } => "rejected",
            StoreError::Serialization(_) => "serialization",
            StoreError::Signing(_) => "signing",
            StoreError::Http(_) => "http",
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else if err.is_connect() {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_unavailable() {
        assert!(StoreError::Timeout.is_unavailable());
        assert!(StoreError::Unavailable("refused".into()).is_unavailable());
        assert!(!StoreError::Conflict.is_unavailable());
        assert!(!StoreError::Rejected {
            status: 400,
            message: "bad".into()
        }
        .is_unavailable());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(StoreError::Conflict.kind(), "conflict");
        assert_eq!(
            StoreError::from(ConnectionStringError::Empty).kind(),
            "config"
        );
    }

    #[test]
    fn test_display() {
        let err = StoreError::Rejected {
            status: 400,
            message: "PropertyValueTooLarge".into(),
        };
        assert_eq!(
            err.to_string(),
            "Table service rejected the request (400): PropertyValueTooLarge"
        );
    }
}
