//! NetCDF reader for gridded bathymetry.
//!
//! Reads global elevation rasters (ETOPO1, ETOPO2, GEBCO) stored as a pair of
//! 1-D coordinate variables and a 2-D `[lat, lon]` elevation variable. The
//! raster is exposed through [`gridgen_common::RasterSource`] so the
//! resampler can pull only the window it needs.
//!
//! # Conventions
//!
//! - Latitude is always served south to north; files stored north to south
//!   are flipped on read.
//! - `_FillValue` and `missing_value` become NaN.
//! - `scale_factor` / `add_offset` are applied before values leave the crate.

pub mod bathymetry;
pub mod error;
pub mod native;

pub use bathymetry::{BathymetryVariables, NetCdfBathymetry};
pub use error::{NetCdfError, NetCdfResult};
pub use native::silence_hdf5_errors;
