//! Shared test utilities for the gridgen workspace.
//!
//! Synthetic rasters, islands and GSHHS records for the stage tests, named
//! target grids, and lookup of the optional ETOPO/GSHHS reference files.

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Resolve a reference dataset through [`find_test_file`], or return from
/// the calling test when it is absent.
///
/// ETOPO and GSHHS files are too large to check in; point `GRIDGEN_REF_DIR`
/// or `TEST_DATA_DIR` at a directory holding them.
///
/// ```ignore
/// let path = require_test_file!("gshhs_c.b");
/// let set = read_gshhs_file(&path, DEFAULT_MAX_LEVEL)?;
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        let Some(path) = $crate::find_test_file($name) else {
            eprintln!(
                "skipping: reference file {} not found (set GRIDGEN_REF_DIR)",
                $name
            );
            return;
        };
        path
    }};
}

/// Assert two depths or coordinates agree within `epsilon`.
///
/// ```ignore
/// assert_approx_eq!(products.depth[(0, 0)], -50.0, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right) = ($left as f64, $right as f64);
        let diff = (left - right).abs();
        assert!(
            diff <= $epsilon as f64,
            "{} and {} differ by {:e}, tolerance {:e}",
            left,
            right,
            diff,
            $epsilon as f64
        );
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "differ by")]
    fn test_assert_approx_eq_reports_difference() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }
}
