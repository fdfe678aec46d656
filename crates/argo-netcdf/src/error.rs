//! Error types for netCDF reading.

use argo_common::ArgoError;
use thiserror::Error;

/// Result type for netCDF reader operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for netCDF reading.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reported by libnetcdf
    #[error("netCDF library error: {0}")]
    Library(#[from] netcdf::error::Error),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl From<NetCdfError> for ArgoError {
    fn from(err: NetCdfError) -> Self {
        match err {
            NetCdfError::IoError(e) => ArgoError::Io(e),
            other => ArgoError::NetCdf(other.to_string()),
        }
    }
}
