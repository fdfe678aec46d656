//! Error types for Argo data fetching.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using ArgoError.
pub type ArgoResult<T> = Result<T, ArgoError>;

/// Primary error type for local loading and dataset operations.
#[derive(Debug, Error)]
pub enum ArgoError {
    // === Request Errors ===
    #[error("Empty request: {0}")]
    EmptyRequest(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Resolution Errors ===
    #[error("No netCDF file found matching: {0}")]
    FileNotFound(String),

    #[error("This float ('{wmo}') is not available at: {root}")]
    UnknownFloat { wmo: u32, root: PathBuf },

    // === Data Errors ===
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    #[error("Shape mismatch for '{name}': {message}")]
    ShapeMismatch { name: String, message: String },

    #[error("Invalid NetCDF data: {0}")]
    NetCdf(String),

    // === Storage Errors ===
    #[error("Cache error: {0}")]
    Cache(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ArgoError {
    /// Shorthand for an invalid parameter error.
    pub fn invalid(param: impl Into<String>, message: impl Into<String>) -> Self {
        ArgoError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// True for the "nothing on disk matched" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ArgoError::FileNotFound(_))
    }
}
