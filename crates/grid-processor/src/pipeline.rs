//! The full preprocessing pipeline.
//!
//! ```text
//! raster ──► generate_grid ──► depth ──► initial_mask
//!                                            │
//! shoreline ──► compute_boundary ──► b ──────┼──► split_boundary ──► clean_mask
//!                                    │       │                          │
//!                                    │       │                     remove_lake
//!                                    │       │                          │
//!                                    └───────┴──────────────────► create_obstr
//! ```
//!
//! The obstruction synthesizer works from the unsplit clipped set, the mask
//! cleaner from the split one.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use gridgen_common::{
    BoundarySet, GridCoords, GridField, GridGenResult, GridType, RasterSource, TargetGrid,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clip::{compute_boundary, ClipParams};
use crate::lake::remove_lake;
use crate::mask::{clean_mask, initial_mask, MaskCleanParams};
use crate::obstruction::{create_obstr, ObstructionParams, Obstructions};
use crate::resample::{generate_grid, ResampleParams};
use crate::split::split_boundary;
use crate::writer::{
    scale_field, write_ascii_obstructions, write_ascii_raster, write_metadata, write_summary,
    MetadataInput, Scales,
};

/// Parameters of one run, independent of where the inputs come from.
#[derive(Debug, Clone)]
pub struct PipelineParams {
    pub grid: TargetGrid,
    pub resample: ResampleParams,
    pub clip: ClipParams,
    pub split_lim: f64,
    pub mask: MaskCleanParams,
    pub lake_tol: i64,
    pub obstruction: ObstructionParams,
}

impl PipelineParams {
    /// Defaults for a grid, with the offsets derived from its spacing.
    pub fn for_grid(grid: TargetGrid) -> Self {
        let d = grid.dx.max(grid.dy);
        let wrap_x = grid.is_global;
        Self {
            grid,
            resample: ResampleParams::default(),
            clip: ClipParams::default(),
            split_lim: 5.0 * d,
            mask: MaskCleanParams {
                lim_val: 0.5,
                offset: d,
            },
            lake_tol: -1,
            obstruction: ObstructionParams::symmetric(1, wrap_x),
        }
    }
}

impl From<&crate::config::GridGenConfig> for PipelineParams {
    fn from(config: &crate::config::GridGenConfig) -> Self {
        Self {
            grid: TargetGrid {
                lon_start: config.lon_range[0],
                lon_end: config.lon_range[1],
                dx: config.dx,
                lat_start: config.lat_range[0],
                lat_end: config.lat_range[1],
                dy: config.dy,
                is_global: config.is_global,
            },
            resample: config.resample_params(),
            clip: config.clip_params(),
            split_lim: config.split_lim(),
            mask: config.mask_params(),
            lake_tol: config.lake_tol,
            obstruction: config.obstruction_params(),
        }
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub nx: usize,
    pub ny: usize,
    pub is_global: bool,
    pub polygons_in: usize,
    pub polygons_clipped: usize,
    pub polygons_split: usize,
    pub wet_after_resample: usize,
    pub cells_dried_by_boundary: usize,
    pub water_bodies: usize,
    pub water_bodies_removed: usize,
    pub wet_final: usize,
    pub boundary_cells: usize,
    pub generated_at: DateTime<Utc>,
}

/// Every product of a run.
#[derive(Debug, Clone)]
pub struct GridProducts {
    pub coords: GridCoords,
    pub depth: GridField<f64>,
    pub mask: GridField<u8>,
    pub label: GridField<i32>,
    pub obstructions: Obstructions,
    /// Shoreline clipped to the grid, unsplit
    pub boundary: BoundarySet,
    pub summary: RunSummary,
}

/// Run every stage on `raster` and, when given, the shoreline polygons.
pub fn run<R: RasterSource + ?Sized>(
    params: &PipelineParams,
    raster: &R,
    boundaries: Option<&BoundarySet>,
) -> GridGenResult<GridProducts> {
    let grid = &params.grid;
    grid.validate()?;
    let coords = grid.coords();
    let (nx, ny) = (coords.nx(), coords.ny());
    info!(nx, ny, is_global = grid.is_global, "Starting grid generation");

    let depth = generate_grid(&coords, raster, &params.resample)?;
    let mut mask = initial_mask(&depth, params.resample.dry_val);
    let wet_after_resample = count_wet(&mask);

    let (boundary, polygons_in, polygons_split, dried) = match boundaries {
        Some(set) if !set.is_empty() => {
            // one extra cell on each side so edge cells see their shoreline
            let domain = coords.bbox().expand(grid.dx.max(grid.dy));
            let clipped = compute_boundary(&domain, set, &params.clip)?;
            let split = split_boundary(&clipped, params.split_lim, params.clip.min_val)?;
            let dried = clean_mask(&coords, &mut mask, &split, &params.mask);
            (clipped, set.len(), split.len(), dried)
        }
        _ => {
            info!("No shoreline polygons, mask taken from bathymetry only");
            (BoundarySet::new(), 0, 0, 0)
        }
    };

    let lakes = remove_lake(&mut mask, params.lake_tol, grid.is_global);
    let obstructions = create_obstr(&coords, &boundary, &mask, &params.obstruction)?;

    let summary = RunSummary {
        nx,
        ny,
        is_global: grid.is_global,
        polygons_in,
        polygons_clipped: boundary.len(),
        polygons_split,
        wet_after_resample,
        cells_dried_by_boundary: dried,
        water_bodies: lakes.num_bodies(),
        water_bodies_removed: lakes.removed.len(),
        wet_final: count_wet(&mask),
        boundary_cells: obstructions.nbnds.data.iter().filter(|&&n| n > 0).count(),
        generated_at: Utc::now(),
    };
    info!(
        wet = summary.wet_final,
        dried = summary.cells_dried_by_boundary,
        bodies_removed = summary.water_bodies_removed,
        "Grid generation complete"
    );

    Ok(GridProducts {
        coords,
        depth,
        mask,
        label: lakes.label,
        obstructions,
        boundary,
        summary,
    })
}

fn count_wet(mask: &GridField<u8>) -> usize {
    mask.data.iter().filter(|&&m| m == 1).count()
}

/// Paths of the files written for one run.
#[derive(Debug, Clone)]
pub struct OutputFiles {
    pub bathymetry: PathBuf,
    pub mask: PathBuf,
    pub obstructions: PathBuf,
    pub metadata: PathBuf,
    pub summary: PathBuf,
}

impl OutputFiles {
    pub fn new(out_dir: &Path, prefix: &str) -> Self {
        let file = |ext: &str| out_dir.join(format!("{}.{}", prefix, ext));
        Self {
            bathymetry: file("bot"),
            mask: file("mask"),
            obstructions: file("obst"),
            metadata: file("meta"),
            summary: file("summary.json"),
        }
    }
}

/// Write the model input files and the run summary into `out_dir`.
pub fn write_products(
    products: &GridProducts,
    out_dir: &Path,
    prefix: &str,
    is_global: bool,
) -> GridGenResult<OutputFiles> {
    std::fs::create_dir_all(out_dir)?;
    let files = OutputFiles::new(out_dir, prefix);
    let scales = Scales::default();

    write_ascii_raster(&files.bathymetry, &scale_field(&products.depth, scales.depth))?;
    write_ascii_raster(&files.mask, &products.mask.map(|&m| i64::from(m)))?;
    write_ascii_obstructions(
        &files.obstructions,
        &scale_field(&products.obstructions.sx, scales.obstr),
        &scale_field(&products.obstructions.sy, scales.obstr),
    )?;
    write_metadata(
        &files.metadata,
        &MetadataInput {
            prefix,
            grid_type: GridType::Rect,
            coords: &products.coords,
            scales,
            is_global,
        },
    )?;
    write_summary(&files.summary, &products.summary)?;

    info!(out_dir = %out_dir.display(), prefix, "Grid files written");
    Ok(files)
}
