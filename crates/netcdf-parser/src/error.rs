//! Error types for NetCDF parsing operations.

use gridgen_common::GridGenError;
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Missing required variable, dimension or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Error reported by the netCDF library
    #[error("NetCDF library error: {0}")]
    Library(String),
}

impl From<netcdf::Error> for NetCdfError {
    fn from(err: netcdf::Error) -> Self {
        NetCdfError::Library(err.to_string())
    }
}

impl From<NetCdfError> for GridGenError {
    fn from(err: NetCdfError) -> Self {
        match err {
            NetCdfError::IoError(e) => GridGenError::Io(e),
            other => GridGenError::data(other.to_string()),
        }
    }
}
