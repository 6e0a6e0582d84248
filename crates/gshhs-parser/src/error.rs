//! Error types for shoreline parsing.

use gridgen_common::GridGenError;
use thiserror::Error;

pub type GshhsResult<T> = Result<T, GshhsError>;

#[derive(Error, Debug)]
pub enum GshhsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record header or point block cut short
    #[error("Truncated record at byte {offset}: {reason}")]
    Truncated { offset: usize, reason: String },

    #[error("Invalid record at byte {offset}: {reason}")]
    InvalidRecord { offset: usize, reason: String },

    /// User polygon file could not be decoded
    #[error("Invalid polygon file: {0}")]
    InvalidPolygonFile(String),
}

impl From<GshhsError> for GridGenError {
    fn from(err: GshhsError) -> Self {
        match err {
            GshhsError::Io(e) => GridGenError::Io(e),
            other => GridGenError::data(other.to_string()),
        }
    }
}
