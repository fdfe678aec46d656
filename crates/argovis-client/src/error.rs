//! Error types for remote requests.

use argo_common::ArgoError;
use thiserror::Error;

/// Result type alias using RemoteError.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Failure of a remote query, returned as a value.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Any status outside 200-299
    #[error("Error: Unexpected response {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected payload from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Failed to build dataset: {0}")]
    Dataset(#[from] ArgoError),
}

impl RemoteError {
    /// True when the server answered with a non-2xx status.
    pub fn is_unexpected_status(&self) -> bool {
        matches!(self, RemoteError::UnexpectedStatus { .. })
    }
}
