//! Run configuration for the grid preprocessor.
//!
//! Loaded from YAML with `${VAR}` / `${VAR:-default}` substitution, then
//! optionally overridden from `GRIDGEN_*` environment variables. Option names
//! are lowercase; the upper-case spellings used by older parameter files
//! (`DRY_VAL`, `LIM_VAL`, ...) are accepted as aliases.

use std::fmt;
use std::path::{Path, PathBuf};

use gridgen_common::{GridGenError, GridGenResult, TargetGrid};
use serde::{Deserialize, Deserializer, Serialize};

use crate::clip::ClipParams;
use crate::mask::MaskCleanParams;
use crate::obstruction::ObstructionParams;
use crate::resample::ResampleParams;

/// Bathymetry dataset; selects the default file and variable names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RefGrid {
    #[default]
    Etopo1,
    Etopo2,
    Gebco,
}

impl RefGrid {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Etopo1 => "etopo1",
            Self::Etopo2 => "etopo2",
            Self::Gebco => "gebco",
        }
    }

    /// File name inside `ref_dir`.
    pub fn file_name(&self) -> String {
        format!("{}.nc", self.as_str())
    }

    /// Default `(lon, lat, elevation)` variable names.
    pub fn variables(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::Etopo1 => ("lon", "lat", "z"),
            Self::Etopo2 => ("x", "y", "z"),
            Self::Gebco => ("lon", "lat", "elevation"),
        }
    }
}

impl fmt::Display for RefGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shoreline database resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryResolution {
    #[default]
    Full,
    High,
    Inter,
    Low,
    Coarse,
}

impl BoundaryResolution {
    /// Single-letter code used in the shoreline file names.
    pub fn code(&self) -> char {
        match self {
            Self::Full => 'f',
            Self::High => 'h',
            Self::Inter => 'i',
            Self::Low => 'l',
            Self::Coarse => 'c',
        }
    }

    pub fn file_name(&self) -> String {
        format!("gshhs_{}.b", self.code())
    }
}

/// Accept `0`/`1` as well as `true`/`false`.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }
    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(other) => Err(serde::de::Error::custom(format!(
            "expected 0 or 1, found {}",
            other
        ))),
    }
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_fname() -> String {
    "grid".to_string()
}
fn default_true() -> bool {
    true
}
fn default_dry_val() -> f64 {
    999999.0
}
fn default_cut_off() -> f64 {
    0.1
}
fn default_lim_bathy() -> f64 {
    0.1
}
fn default_lim_val() -> f64 {
    0.5
}
fn default_lake_tol() -> i64 {
    -1
}
fn default_obstr_offset() -> usize {
    1
}
fn default_min_val() -> f64 {
    4.0
}
fn default_max_level() -> u8 {
    3
}

/// Everything one preprocessing run needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridGenConfig {
    /// Directory holding the bathymetry and shoreline files
    pub ref_dir: PathBuf,
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Output file prefix
    #[serde(default = "default_fname")]
    pub fname: String,

    // === Target grid ===
    pub dx: f64,
    pub dy: f64,
    pub lon_range: [f64; 2],
    pub lat_range: [f64; 2],
    #[serde(default, deserialize_with = "flag", alias = "IS_GLOBAL")]
    pub is_global: bool,

    // === Inputs ===
    #[serde(default)]
    pub ref_grid: RefGrid,
    #[serde(default)]
    pub var_lon: Option<String>,
    #[serde(default)]
    pub var_lat: Option<String>,
    #[serde(default)]
    pub var_bathy: Option<String>,
    #[serde(default)]
    pub boundary: BoundaryResolution,
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub read_boundary: bool,
    /// Highest shoreline level read from the database
    #[serde(default = "default_max_level")]
    pub max_level: u8,
    #[serde(default, deserialize_with = "flag")]
    pub opt_poly: bool,
    #[serde(default)]
    pub fname_poly: Option<PathBuf>,

    // === Thresholds ===
    #[serde(default = "default_dry_val", alias = "DRY_VAL")]
    pub dry_val: f64,
    #[serde(default = "default_cut_off", alias = "CUT_OFF")]
    pub cut_off: f64,
    #[serde(default = "default_lim_bathy", alias = "LIM_BATHY")]
    pub lim_bathy: f64,
    #[serde(default = "default_lim_val", alias = "LIM_VAL")]
    pub lim_val: f64,
    /// Defaults to `max(dx, dy)`
    #[serde(default, alias = "OFFSET")]
    pub offset: Option<f64>,
    /// Defaults to `5 * max(dx, dy)`
    #[serde(default, alias = "SPLIT_LIM")]
    pub split_lim: Option<f64>,
    #[serde(default = "default_lake_tol", alias = "LAKE_TOL")]
    pub lake_tol: i64,
    #[serde(default = "default_obstr_offset", alias = "OBSTR_OFFSET")]
    pub obstr_offset: usize,
    #[serde(default = "default_min_val", alias = "MIN_VAL")]
    pub min_val: f64,

    /// Worker threads; rayon's default when unset
    #[serde(default)]
    pub num_threads: Option<usize>,
}

impl GridGenConfig {
    /// Parse YAML after substituting environment variables.
    pub fn from_yaml_str(content: &str) -> GridGenResult<Self> {
        let expanded = expand_env_vars(content)?;
        serde_yaml::from_str(&expanded)
            .map_err(|e| GridGenError::config(format!("invalid configuration: {}", e)))
    }

    /// Load a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> GridGenResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GridGenError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Apply `GRIDGEN_OUT_DIR`, `GRIDGEN_REF_DIR` and `GRIDGEN_NUM_THREADS`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("GRIDGEN_OUT_DIR") {
            self.out_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("GRIDGEN_REF_DIR") {
            self.ref_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("GRIDGEN_NUM_THREADS") {
            if let Ok(n) = val.parse() {
                self.num_threads = Some(n);
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> GridGenResult<()> {
        if !self.ref_dir.is_dir() {
            return Err(GridGenError::config(format!(
                "ref_dir {} does not exist",
                self.ref_dir.display()
            )));
        }

        self.target_grid()?;

        for (name, value) in [("lim_val", self.lim_val), ("lim_bathy", self.lim_bathy)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GridGenError::config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.offset() < 0.0 {
            return Err(GridGenError::config("offset must be >= 0"));
        }

        if self.split_lim() <= 0.0 {
            return Err(GridGenError::config("split_lim must be > 0"));
        }

        if self.obstr_offset > 1 {
            return Err(GridGenError::config(format!(
                "obstr_offset must be 0 or 1, got {}",
                self.obstr_offset
            )));
        }

        if self.min_val <= 0.0 {
            return Err(GridGenError::config("min_val must be > 0"));
        }

        if self.opt_poly && self.fname_poly.is_none() {
            return Err(GridGenError::config("opt_poly is set but fname_poly is missing"));
        }

        if self.fname.is_empty() || self.fname.contains(std::path::MAIN_SEPARATOR) {
            return Err(GridGenError::config(format!(
                "fname must be a plain file prefix, got {:?}",
                self.fname
            )));
        }

        if self.num_threads == Some(0) {
            return Err(GridGenError::config("num_threads must be > 0"));
        }

        Ok(())
    }

    pub fn target_grid(&self) -> GridGenResult<TargetGrid> {
        TargetGrid::new(self.lon_range, self.lat_range, self.dx, self.dy, self.is_global)
    }

    pub fn offset(&self) -> f64 {
        self.offset.unwrap_or_else(|| self.dx.max(self.dy))
    }

    pub fn split_lim(&self) -> f64 {
        self.split_lim.unwrap_or_else(|| 5.0 * self.dx.max(self.dy))
    }

    pub fn bathymetry_path(&self) -> PathBuf {
        self.ref_dir.join(self.ref_grid.file_name())
    }

    /// `(lon, lat, elevation)` variable names, overrides first.
    pub fn bathymetry_variables(&self) -> (String, String, String) {
        let (lon, lat, z) = self.ref_grid.variables();
        (
            self.var_lon.clone().unwrap_or_else(|| lon.to_string()),
            self.var_lat.clone().unwrap_or_else(|| lat.to_string()),
            self.var_bathy.clone().unwrap_or_else(|| z.to_string()),
        )
    }

    pub fn boundary_path(&self) -> PathBuf {
        self.ref_dir.join(self.boundary.file_name())
    }

    /// User polygon file, resolved against `ref_dir` when relative.
    pub fn user_polygon_path(&self) -> Option<PathBuf> {
        let path = self.fname_poly.as_ref()?;
        Some(if path.is_absolute() {
            path.clone()
        } else {
            self.ref_dir.join(path)
        })
    }

    pub fn resample_params(&self) -> ResampleParams {
        ResampleParams {
            lim_bathy: self.lim_bathy,
            cut_off: self.cut_off,
            dry_val: self.dry_val,
        }
    }

    /// Clip parameters for the land level.
    pub fn clip_params(&self) -> ClipParams {
        ClipParams {
            min_val: self.min_val,
            ..ClipParams::default()
        }
    }

    pub fn mask_params(&self) -> MaskCleanParams {
        MaskCleanParams {
            lim_val: self.lim_val,
            offset: self.offset(),
        }
    }

    pub fn obstruction_params(&self) -> ObstructionParams {
        ObstructionParams::symmetric(self.obstr_offset, self.is_global)
    }
}

/// Expand `${VAR}` and `${VAR:-default}` references.
pub fn expand_env_vars(content: &str) -> GridGenResult<String> {
    let mut result = String::new();
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => {
                        return Err(GridGenError::config(format!(
                            "unclosed variable substitution: ${{{}",
                            var_expr
                        )))
                    }
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve `VAR` or `VAR:-default`.
fn resolve_var_expr(expr: &str) -> GridGenResult<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).map_err(|_| {
            GridGenError::config(format!("environment variable {} is not set", expr.trim()))
        })
    }
}
