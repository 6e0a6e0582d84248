//! Bathymetry raster access.
//!
//! The resampler never touches files directly; it reads through
//! [`RasterSource`], implemented by the NetCDF reader and by
//! [`MemoryRaster`] for tests and pre-loaded data.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{GridField, GridGenError, GridGenResult};

/// Longitude convention of a raster axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LonConvention {
    /// Longitudes in [-180, 180]
    Signed,
    /// Longitudes in [0, 360]
    Positive,
}

impl LonConvention {
    /// Infer the convention from an axis.
    pub fn detect(lon_axis: &[f64]) -> Self {
        let max = lon_axis.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if max > 180.0 {
            LonConvention::Positive
        } else {
            LonConvention::Signed
        }
    }

    /// Express `lon` in this convention.
    pub fn normalize(&self, lon: f64) -> f64 {
        match self {
            LonConvention::Signed if lon > 180.0 => lon - 360.0,
            LonConvention::Positive if lon < 0.0 => lon + 360.0,
            _ => lon,
        }
    }
}

/// A 2-D elevation raster with ascending 1-D axes.
pub trait RasterSource {
    /// Longitude axis, ascending.
    fn lon(&self) -> &[f64];

    /// Latitude axis, ascending.
    fn lat(&self) -> &[f64];

    /// Read elevation rows `lat_idx` and columns `lon_idx` (half-open ranges).
    ///
    /// Missing values are returned as NaN.
    fn read_window(
        &self,
        lat_idx: Range<usize>,
        lon_idx: Range<usize>,
    ) -> GridGenResult<GridField<f64>>;

    /// Raster node spacing `(dx_base, dy_base)`.
    fn resolution(&self) -> (f64, f64) {
        let lon = self.lon();
        let lat = self.lat();
        let dx = if lon.len() > 1 { (lon[1] - lon[0]).abs() } else { 0.0 };
        let dy = if lat.len() > 1 { (lat[1] - lat[0]).abs() } else { 0.0 };
        (dx, dy)
    }

    /// Elevation range advertised by the source, if any.
    fn actual_range(&self) -> Option<(f64, f64)> {
        None
    }

    /// Longitude convention of the raster.
    fn lon_convention(&self) -> LonConvention {
        LonConvention::detect(self.lon())
    }
}

/// A raster held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryRaster {
    lon: Vec<f64>,
    lat: Vec<f64>,
    elevation: GridField<f64>,
}

impl MemoryRaster {
    /// Wrap axes and an elevation field of shape `[lat.len(), lon.len()]`.
    pub fn new(lon: Vec<f64>, lat: Vec<f64>, elevation: GridField<f64>) -> GridGenResult<Self> {
        if elevation.nx != lon.len() || elevation.ny != lat.len() {
            return Err(GridGenError::data(format!(
                "elevation shape {}x{} does not match axes {}x{}",
                elevation.ny,
                elevation.nx,
                lat.len(),
                lon.len()
            )));
        }
        if lon.len() < 2 || lat.len() < 2 {
            return Err(GridGenError::data("raster needs at least 2 nodes per axis"));
        }
        if lon.windows(2).any(|w| w[1] <= w[0]) || lat.windows(2).any(|w| w[1] <= w[0]) {
            return Err(GridGenError::data("raster axes must be strictly ascending"));
        }
        Ok(Self {
            lon,
            lat,
            elevation,
        })
    }

    /// Build a raster by evaluating `f(lon, lat)` at every node.
    pub fn from_fn<F: Fn(f64, f64) -> f64>(
        lon: Vec<f64>,
        lat: Vec<f64>,
        f: F,
    ) -> GridGenResult<Self> {
        let mut data = Vec::with_capacity(lon.len() * lat.len());
        for &y in &lat {
            for &x in &lon {
                data.push(f(x, y));
            }
        }
        let elevation = GridField::from_vec(lon.len(), lat.len(), data)?;
        Self::new(lon, lat, elevation)
    }
}

impl RasterSource for MemoryRaster {
    fn lon(&self) -> &[f64] {
        &self.lon
    }

    fn lat(&self) -> &[f64] {
        &self.lat
    }

    fn read_window(
        &self,
        lat_idx: Range<usize>,
        lon_idx: Range<usize>,
    ) -> GridGenResult<GridField<f64>> {
        if lat_idx.end > self.lat.len() || lon_idx.end > self.lon.len() {
            return Err(GridGenError::data(format!(
                "window rows {:?} cols {:?} outside raster {}x{}",
                lat_idx,
                lon_idx,
                self.lat.len(),
                self.lon.len()
            )));
        }
        let nx = lon_idx.len();
        let ny = lat_idx.len();
        let mut data = Vec::with_capacity(nx * ny);
        for k in lat_idx {
            data.extend_from_slice(&self.elevation.row(k)[lon_idx.clone()]);
        }
        GridField::from_vec(nx, ny, data)
    }
}
