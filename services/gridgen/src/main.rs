//! Wave-model grid generator.
//!
//! Reads a run configuration, resamples the reference bathymetry onto the
//! target grid, applies the shoreline polygons and writes the model input
//! files (`.bot`, `.mask`, `.obst`, `.meta`) plus a JSON run summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use grid_processor::{run, write_products, GridGenConfig, PipelineParams};
use gridgen_common::BoundarySet;
use netcdf_parser::{BathymetryVariables, NetCdfBathymetry};

#[derive(Parser, Debug)]
#[command(name = "gridgen")]
#[command(about = "Generate bathymetry, mask and obstruction grids for a spectral wave model")]
struct Args {
    /// Run configuration file (YAML)
    #[arg(short, long, default_value = "config/gridgen.yaml", env = "GRIDGEN_CONFIG")]
    config: PathBuf,

    /// Output directory, overrides the configuration
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Worker threads, overrides the configuration
    #[arg(long)]
    num_threads: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Log format: "json" or "pretty"
    #[arg(long, default_value = "pretty", env = "GRIDGEN_LOG_FORMAT")]
    log_format: String,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, &args.log_format);

    let mut config = GridGenConfig::load(&args.config)
        .with_context(|| format!("Failed to load configuration from {:?}", args.config))?;
    config.apply_env_overrides();
    if let Some(out_dir) = args.out_dir {
        config.out_dir = out_dir;
    }
    if args.num_threads.is_some() {
        config.num_threads = args.num_threads;
    }
    config.validate().context("Invalid configuration")?;

    info!(
        config = %args.config.display(),
        out_dir = %config.out_dir.display(),
        fname = %config.fname,
        "Starting grid generation"
    );

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(n) = config.num_threads {
        pool = pool.num_threads(n);
    }
    let pool = pool.build().context("Failed to build worker pool")?;
    info!(threads = pool.current_num_threads(), "Worker pool ready");

    pool.install(|| generate(&config))
}

fn init_tracing(log_level: &str, log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);
    if log_format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn generate(config: &GridGenConfig) -> Result<()> {
    let bathy_path = config.bathymetry_path();
    let (lon, lat, z) = config.bathymetry_variables();
    let raster = NetCdfBathymetry::open(&bathy_path, BathymetryVariables::new(&lon, &lat, &z))
        .with_context(|| format!("Failed to open bathymetry {:?}", bathy_path))?;

    let boundaries = load_boundaries(config)?;
    if boundaries.is_none() {
        warn!("No shoreline polygons configured, mask follows bathymetry only");
    }

    let params = PipelineParams::from(config);
    let products = run(&params, &raster, boundaries.as_ref()).context("Grid generation failed")?;

    let files = write_products(&products, &config.out_dir, &config.fname, config.is_global)
        .with_context(|| format!("Failed to write grid files to {:?}", config.out_dir))?;

    info!(
        nx = products.summary.nx,
        ny = products.summary.ny,
        wet = products.summary.wet_final,
        bathymetry = %files.bathymetry.display(),
        metadata = %files.metadata.display(),
        "Grid generation finished"
    );
    Ok(())
}

/// Shoreline database and user polygons, whichever are enabled.
fn load_boundaries(config: &GridGenConfig) -> Result<Option<BoundarySet>> {
    let mut set = BoundarySet::new();
    let mut any = false;

    if config.read_boundary {
        let path = config.boundary_path();
        let shoreline = gshhs_parser::read_gshhs_file(&path, config.max_level)
            .with_context(|| format!("Failed to read shoreline {:?}", path))?;
        set.extend(shoreline);
        any = true;
    }

    if let Some(path) = config.user_polygon_path().filter(|_| config.opt_poly) {
        let user = gshhs_parser::read_user_polygons(&path)
            .with_context(|| format!("Failed to read user polygons {:?}", path))?;
        set.extend(user);
        any = true;
    }

    Ok(any.then_some(set))
}
