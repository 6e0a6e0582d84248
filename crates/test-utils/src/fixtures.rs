//! Common test fixtures for the grid preprocessor.
//!
//! Target grids and thresholds that show up across the test suite.

/// Target grid definitions as `([w, e], [s, n], dx, dy)`.
pub mod grids {
    pub type GridDef = ([f64; 2], [f64; 2], f64, f64);

    /// Two nodes per axis, 0.05° apart, in open ocean
    pub const SINGLE_CELL_OCEAN: GridDef = ([110.0, 110.05], [10.0, 10.05], 0.05, 0.05);

    /// Unit square, one degree spacing
    pub const UNIT_SQUARE: GridDef = ([0.0, 1.0], [0.0, 1.0], 1.0, 1.0);

    /// Straddles the antimeridian, expressed past 180
    pub const ANTIMERIDIAN: GridDef = ([178.0, 182.0], [0.0, 1.0], 1.0, 1.0);

    /// Coarse global grid
    pub const GLOBAL_30: GridDef = ([-180.0, 150.0], [-60.0, 60.0], 30.0, 30.0);

    /// Small regional grid used by the end-to-end tests
    pub const REGIONAL: GridDef = ([0.0, 4.0], [0.0, 3.0], 0.5, 0.5);
}

/// Default thresholds of a run.
pub mod thresholds {
    pub const DRY_VAL: f64 = 999999.0;
    pub const CUT_OFF: f64 = 0.1;
    pub const LIM_BATHY: f64 = 0.1;
    pub const LIM_VAL: f64 = 0.5;
    pub const MIN_VAL: f64 = 4.0;
}

/// Shoreline file names per resolution code.
pub mod shoreline {
    pub const FULL: &str = "gshhs_f.b";
    pub const COARSE: &str = "gshhs_c.b";
}

/// Minimal YAML run configuration; `ref_dir` is substituted by the caller.
pub fn minimal_config_yaml(ref_dir: &std::path::Path) -> String {
    format!(
        "ref_dir: {}\nfname: test\ndx: 0.5\ndy: 0.5\nlon_range: [0, 4]\nlat_range: [0, 3]\nread_boundary: 0\n",
        ref_dir.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_defs_have_two_nodes() {
        for (lon, lat, dx, dy) in [grids::SINGLE_CELL_OCEAN, grids::UNIT_SQUARE, grids::REGIONAL] {
            assert!(((lon[1] - lon[0]) / dx).round() >= 1.0);
            assert!(((lat[1] - lat[0]) / dy).round() >= 1.0);
        }
    }

    #[test]
    fn test_minimal_config_mentions_dir() {
        let yaml = minimal_config_yaml(std::path::Path::new("/data/ref"));
        assert!(yaml.contains("ref_dir: /data/ref"));
    }
}
