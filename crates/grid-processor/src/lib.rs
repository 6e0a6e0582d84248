//! Wave-model grid preprocessing.
//!
//! Turns a global bathymetry raster and a shoreline polygon database into the
//! inputs of a spectral wave model on a regular lon/lat grid:
//!
//! - **Depth**: bathymetry resampled per cell (bilinear when the cell is no
//!   larger than a raster pixel, wet-area averaged otherwise)
//! - **Mask**: wet where a depth exists, dried where shoreline polygons cover
//!   most of the cell, with disconnected water bodies optionally removed
//! - **Obstructions**: fraction of each cell face blocked by unresolved land
//!
//! # Architecture
//!
//! ```text
//! RasterSource ──► resample::generate_grid ──► depth, mask
//!                                                  │
//! BoundarySet ──► clip::compute_boundary ──► split::split_boundary
//!                        │                          │
//!                        │                   mask::clean_mask
//!                        │                          │
//!                        │                   lake::remove_lake
//!                        │                          │
//!                        └──────────► obstruction::create_obstr
//!                                                  │
//!                                               writer
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::{run, write_products, PipelineParams};
//! use gridgen_common::TargetGrid;
//!
//! let grid = TargetGrid::new([110.0, 120.0], [0.0, 10.0], 0.1, 0.1, false)?;
//! let products = run(&PipelineParams::for_grid(grid), &raster, Some(&shoreline))?;
//! write_products(&products, "out".as_ref(), "asia", false)?;
//! ```

pub mod clip;
pub mod config;
pub mod geometry;
pub mod lake;
pub mod mask;
pub mod obstruction;
pub mod pipeline;
pub mod resample;
pub mod split;
pub mod writer;

// Re-export commonly used items at crate root
pub use clip::{compute_boundary, ClipParams};
pub use config::{BoundaryResolution, GridGenConfig, RefGrid};
pub use geometry::{cell_corners, point_in_polygon, CellCorners, Point};
pub use lake::{remove_lake, LakeResult};
pub use mask::{clean_mask, initial_mask, MaskCleanParams};
pub use obstruction::{create_obstr, zero_dry_neighbors, ObstructionParams, Obstructions};
pub use pipeline::{run, write_products, GridProducts, OutputFiles, PipelineParams, RunSummary};
pub use resample::{generate_grid, ResampleParams};
pub use split::split_boundary;
pub use writer::{
    read_ascii_raster, write_ascii_obstructions, write_ascii_raster, write_metadata, write_summary,
};
