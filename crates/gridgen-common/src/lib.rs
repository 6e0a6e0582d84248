//! Common types shared by the grid preprocessor crates.
//!
//! Everything that crosses a crate boundary lives here: the target grid and
//! its 2-D fields, the shoreline polygon model, the raster source trait the
//! resampler reads from, and the error type every stage returns.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod polygon;
pub mod raster;

pub use bbox::BoundingBox;
pub use error::{GridGenError, GridGenResult};
pub use grid::{GridCoords, GridField, GridType, TargetGrid};
pub use polygon::{BoundarySet, FlatBoundary, Polygon, PolygonLevel};
pub use raster::{LonConvention, MemoryRaster, RasterSource};
