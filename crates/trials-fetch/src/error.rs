//! Error types for dataset retrieval.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a fetch run.
///
/// End-of-data conditions (non-success status, missing body keys, missing
/// continuation token) are not errors; see [`crate::StopReason`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// The request never produced an HTTP response.
    #[error("transport error calling {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// The configured endpoint could not be turned into a request URL.
    #[error("invalid endpoint {endpoint}: {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// Page store file could not be read or written.
    #[error("page store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Page store file is not a valid JSON array of pages.
    #[error("page store JSON error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    /// Returns whether a bounded retry may help.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
