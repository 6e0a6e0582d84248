//! Error types for the grid preprocessor.

use thiserror::Error;

/// Result type alias using GridGenError.
pub type GridGenResult<T> = Result<T, GridGenError>;

/// Primary error type for every pipeline stage.
#[derive(Debug, Error)]
pub enum GridGenError {
    // === Input errors ===
    /// Missing reference file, non-existent directory or invalid option.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Target range outside the raster, inconsistent polygon crossings.
    #[error("Coordinate error: {0}")]
    Coordinate(String),

    /// Polygon reassembly could not find a reachable crossing.
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Missing NetCDF variable, empty window read, malformed shoreline file.
    #[error("Data error: {0}")]
    Data(String),

    // === Output errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GridGenError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn coordinate(msg: impl Into<String>) -> Self {
        Self::Coordinate(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Short, stable name of the error kind (used in logs and the run summary).
    pub fn kind(&self) -> &'static str {
        match self {
            GridGenError::Config(_) => "config",
            GridGenError::Coordinate(_) => "coordinate",
            GridGenError::Geometry(_) => "geometry",
            GridGenError::Data(_) => "data",
            GridGenError::Io(_) => "io",
        }
    }
}

impl From<serde_json::Error> for GridGenError {
    fn from(err: serde_json::Error) -> Self {
        GridGenError::Data(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        assert_eq!(GridGenError::config("x").kind(), "config");
        assert_eq!(GridGenError::geometry("x").kind(), "geometry");
        let io: GridGenError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(io.kind(), "io");
    }

    #[test]
    fn test_error_display() {
        let err = GridGenError::coordinate("latitude 95 outside raster");
        assert_eq!(err.to_string(), "Coordinate error: latitude 95 outside raster");
    }
}
