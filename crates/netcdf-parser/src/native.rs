//! Thin helpers over the native netcdf library.
//!
//! Opening files, reading 1-D coordinate axes and pulling typed attribute
//! values without tripping HDF5's diagnostic output.

use std::path::Path;
use std::sync::Once;

use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist). This creates confusing log spam like:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// Safe to call multiple times; only the first call has an effect.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Open a NetCDF file for reading.
pub fn open_dataset(path: &Path) -> NetCdfResult<netcdf::File> {
    if !path.exists() {
        return Err(NetCdfError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("bathymetry file not found: {}", path.display()),
        )));
    }

    silence_hdf5_errors();

    netcdf::open(path).map_err(|e| {
        NetCdfError::InvalidFormat(format!("Failed to open NetCDF {}: {}", path.display(), e))
    })
}

/// Read a whole 1-D coordinate variable as f64.
pub fn read_axis(file: &netcdf::File, name: &str) -> NetCdfResult<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))?;

    if var.dimensions().len() != 1 {
        return Err(NetCdfError::InvalidFormat(format!(
            "coordinate variable {} must be 1-D, has {} dimensions",
            name,
            var.dimensions().len()
        )));
    }

    let values: Vec<f64> = var
        .get_values(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;

    Ok(values)
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
pub fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get a scalar f64 attribute.
pub fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

/// Helper to get a two-element numeric attribute such as `actual_range`.
pub fn get_range_attr(var: &netcdf::Variable, name: &str) -> Option<(f64, f64)> {
    use netcdf::AttributeValue;

    if !has_attr(var, name) {
        return None;
    }
    let values: Vec<f64> = match var.attribute_value(name)?.ok()? {
        AttributeValue::Doubles(v) => v,
        AttributeValue::Floats(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Ints(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Shorts(v) => v.into_iter().map(f64::from).collect(),
        _ => return None,
    };
    match values.as_slice() {
        [lo, hi] => Some((*lo, *hi)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let err = open_dataset(Path::new("/nonexistent/etopo1.nc")).unwrap_err();
        assert!(matches!(err, NetCdfError::IoError(_)));
        assert!(err.to_string().contains("etopo1.nc"));
    }

    #[test]
    fn test_silence_is_idempotent() {
        silence_hdf5_errors();
        silence_hdf5_errors();
    }
}
