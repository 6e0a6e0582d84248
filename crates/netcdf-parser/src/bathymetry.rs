//! Bathymetry raster reader.
//!
//! Opens an ETOPO/GEBCO style file (1-D lon, 1-D lat, 2-D elevation
//! `[lat, lon]`), keeps the handle for the duration of resampling and serves
//! index windows through [`RasterSource`]. Fill values are materialized to
//! NaN and packed values are unscaled on read, so callers never see masked
//! data.

use std::ops::Range;
use std::path::{Path, PathBuf};

use gridgen_common::{GridField, GridGenResult, RasterSource};
use tracing::{debug, info};

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{get_f64_attr, get_range_attr, open_dataset, read_axis};

/// Names of the variables holding the raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BathymetryVariables {
    pub lon: String,
    pub lat: String,
    pub elevation: String,
}

impl BathymetryVariables {
    pub fn new(lon: &str, lat: &str, elevation: &str) -> Self {
        Self {
            lon: lon.to_string(),
            lat: lat.to_string(),
            elevation: elevation.to_string(),
        }
    }

    /// ETOPO1 (1 arc-minute) naming.
    pub fn etopo1() -> Self {
        Self::new("lon", "lat", "z")
    }

    /// ETOPO2 (2 arc-minute) naming.
    pub fn etopo2() -> Self {
        Self::new("x", "y", "z")
    }

    /// GEBCO gridded bathymetry naming.
    pub fn gebco() -> Self {
        Self::new("lon", "lat", "elevation")
    }
}

/// Packing attributes of the elevation variable.
#[derive(Debug, Clone, Copy, Default)]
struct Packing {
    fill_value: Option<f64>,
    missing_value: Option<f64>,
    scale_factor: f64,
    add_offset: f64,
}

impl Packing {
    fn unpack(&self, raw: f64) -> f64 {
        if raw.is_nan()
            || self.fill_value.is_some_and(|f| raw == f)
            || self.missing_value.is_some_and(|m| raw == m)
        {
            f64::NAN
        } else {
            raw * self.scale_factor + self.add_offset
        }
    }
}

/// Axes and packing of a bathymetry raster.
///
/// No file handle is kept; each window read reopens the dataset and closes it
/// when the read returns.
pub struct NetCdfBathymetry {
    path: PathBuf,
    vars: BathymetryVariables,
    lon: Vec<f64>,
    lat: Vec<f64>,
    /// File stores latitude north to south
    lat_descending: bool,
    packing: Packing,
    actual_range: Option<(f64, f64)>,
}

impl NetCdfBathymetry {
    /// Open `path` and read its coordinate axes.
    pub fn open<P: AsRef<Path>>(path: P, vars: BathymetryVariables) -> NetCdfResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = open_dataset(&path)?;

        let lon = read_axis(&file, &vars.lon)?;
        let mut lat = read_axis(&file, &vars.lat)?;
        if lon.len() < 2 || lat.len() < 2 {
            return Err(NetCdfError::InvalidFormat(format!(
                "raster axes too short ({} lon, {} lat)",
                lon.len(),
                lat.len()
            )));
        }
        if lon.windows(2).any(|w| w[1] <= w[0]) {
            return Err(NetCdfError::InvalidFormat(format!(
                "longitude variable {} is not strictly ascending",
                vars.lon
            )));
        }

        let lat_descending = lat[1] < lat[0];
        if lat_descending {
            lat.reverse();
        }

        let elevation = file
            .variable(&vars.elevation)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", vars.elevation)))?;

        let dims: Vec<usize> = elevation.dimensions().iter().map(|d| d.len()).collect();
        if dims != [lat.len(), lon.len()] {
            return Err(NetCdfError::InvalidFormat(format!(
                "{} has shape {:?}, expected [{}, {}] ([lat, lon])",
                vars.elevation,
                dims,
                lat.len(),
                lon.len()
            )));
        }

        let packing = Packing {
            fill_value: get_f64_attr(&elevation, "_FillValue"),
            missing_value: get_f64_attr(&elevation, "missing_value"),
            scale_factor: get_f64_attr(&elevation, "scale_factor").unwrap_or(1.0),
            add_offset: get_f64_attr(&elevation, "add_offset").unwrap_or(0.0),
        };
        let actual_range = get_range_attr(&elevation, "actual_range");

        info!(
            path = %path.display(),
            nx = lon.len(),
            ny = lat.len(),
            lat_descending,
            actual_range = ?actual_range,
            "Opened bathymetry raster"
        );

        Ok(Self {
            path,
            vars,
            lon,
            lat,
            lat_descending,
            packing,
            actual_range,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows(
        &self,
        lat_idx: Range<usize>,
        lon_idx: Range<usize>,
    ) -> NetCdfResult<GridField<f64>> {
        let ny_file = self.lat.len();
        if lat_idx.end > ny_file || lon_idx.end > self.lon.len() || lat_idx.is_empty() || lon_idx.is_empty() {
            return Err(NetCdfError::InvalidFormat(format!(
                "window rows {:?} cols {:?} outside raster {}x{}",
                lat_idx,
                lon_idx,
                ny_file,
                self.lon.len()
            )));
        }

        // Map ascending row indices back onto the file's storage order.
        let file_rows = if self.lat_descending {
            (ny_file - lat_idx.end)..(ny_file - lat_idx.start)
        } else {
            lat_idx.clone()
        };

        let file = open_dataset(&self.path)?;
        let var = file
            .variable(&self.vars.elevation)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", self.vars.elevation)))?;

        let raw: Vec<f64> = var
            .get_values((file_rows.clone(), lon_idx.clone()))
            .map_err(|e| {
                NetCdfError::InvalidFormat(format!("Failed to read {}: {}", self.vars.elevation, e))
            })?;

        let nx = lon_idx.len();
        let ny = lat_idx.len();
        if raw.len() != nx * ny {
            return Err(NetCdfError::InvalidFormat(format!(
                "window read returned {} values, expected {}",
                raw.len(),
                nx * ny
            )));
        }

        let mut data: Vec<f64> = raw.into_iter().map(|v| self.packing.unpack(v)).collect();
        if self.lat_descending {
            let mut flipped = Vec::with_capacity(data.len());
            for row in data.chunks(nx).rev() {
                flipped.extend_from_slice(row);
            }
            data = flipped;
        }

        debug!(rows = ?lat_idx, cols = ?lon_idx, "Read bathymetry window");

        GridField::from_vec(nx, ny, data).map_err(|e| NetCdfError::InvalidFormat(e.to_string()))
    }
}

impl RasterSource for NetCdfBathymetry {
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
        Ok(self.read_rows(lat_idx, lon_idx)?)
    }

    fn actual_range(&self) -> Option<(f64, f64)> {
        self.actual_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing_unpack() {
        let packing = Packing {
            fill_value: Some(-32768.0),
            missing_value: None,
            scale_factor: 0.5,
            add_offset: 10.0,
        };
        assert!(packing.unpack(-32768.0).is_nan());
        assert_eq!(packing.unpack(4.0), 12.0);
    }

    #[test]
    fn test_variable_presets() {
        assert_eq!(BathymetryVariables::etopo1().elevation, "z");
        assert_eq!(BathymetryVariables::etopo2().lon, "x");
        assert_eq!(BathymetryVariables::gebco().elevation, "elevation");
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let result = NetCdfBathymetry::open("/no/such/gebco.nc", BathymetryVariables::gebco());
        assert!(matches!(result, Err(NetCdfError::IoError(_))));
    }
}
