// Error types for the dictionary lookup service
//
// thiserror definitions, one enum per concern:
// - Remote lookups (shared between single-flight waiters, hence Clone)
// - Persistent store I/O
// - User input validation
// - Configuration

use std::sync::Arc;
use thiserror::Error;

/// Remote dictionary API errors
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("API request failed: {0}")]
    Transport(Arc<reqwest::Error>),

    #[error("API responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Lookup task ended without a result")]
    Aborted,
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        LookupError::Transport(Arc::new(err))
    }
}

impl LookupError {
    /// HTTP status reported by the upstream API, if it answered at all
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            LookupError::Status { status, .. } => Some(*status),
            LookupError::Transport(err) => err.status().map(|s| s.as_u16()),
            LookupError::InvalidResponse(_) | LookupError::Aborted => None,
        }
    }
}

/// Persistent store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to load store from {path}: {source}")]
    LoadFailed {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to save store to {path}: {source}")]
    SaveFailed {
        path: String,
        source: std::io::Error,
    },

    #[error("Store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Word input validation errors, worded for display to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter text")]
    Empty,

    #[error("Input must be a single word")]
    NotASingleWord,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid dictionary API URL {url}: {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("Server port must be > 0")]
    InvalidPort,

    #[error("Invalid cache path: {0}")]
    InvalidCachePath(String),

    #[error("Environment variable parsing failed: {0}")]
    EnvVarError(String),
}

pub type LookupResult<T> = Result<T, LookupError>;
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::Empty.to_string(), "Please enter text");
        assert_eq!(
            ValidationError::NotASingleWord.to_string(),
            "Input must be a single word"
        );
    }

    #[test]
    fn test_status_error_reports_upstream_status() {
        let err = LookupError::Status {
            status: 403,
            body: "key blocked".to_string(),
        };
        assert_eq!(err.upstream_status(), Some(403));
        assert!(err.to_string().contains("403"));
        assert_eq!(LookupError::InvalidResponse("x".into()).upstream_status(), None);
    }
}
