//! Bathymetry resampling onto the target grid.
//!
//! Each target cell is either bilinearly interpolated (cell no larger than
//! one raster cell on both axes) or area-averaged over the raster nodes it
//! covers, gated by the fraction of those nodes that are wet.
//!
//! ```text
//! target extent ± 2 cells
//!      │
//!      ▼
//! raster window (one or two column pieces, wrapped across the seam)
//!      │
//!      ├─► ndx ≤ 1 && ndy ≤ 1 ─► bilinear, dry if ≥ cut_off
//!      │
//!      └─► otherwise ─────────► wet nodes / all nodes > lim_bathy ? mean : dry
//! ```

use std::ops::Range;

use gridgen_common::{
    BoundingBox, GridCoords, GridField, GridGenError, GridGenResult, LonConvention, RasterSource,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::geometry::cell_corners;

/// Longitude slack accepted at the edges of a non-periodic raster.
const LON_TOLERANCE: f64 = 0.01;

/// Target cells added on each side of the raster window.
const WINDOW_MARGIN_CELLS: f64 = 2.0;

/// Resampling thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResampleParams {
    /// Minimum wet fraction for an averaged cell to be wet.
    pub lim_bathy: f64,
    /// Elevations at or above this are land.
    pub cut_off: f64,
    /// Depth assigned to dry cells.
    pub dry_val: f64,
}

impl Default for ResampleParams {
    fn default() -> Self {
        Self {
            lim_bathy: 0.1,
            cut_off: 0.1,
            dry_val: 999999.0,
        }
    }
}

/// Raster subset around the target, with a monotonic longitude axis that may
/// run past the raster's own seam.
struct RasterWindow {
    lon: Vec<f64>,
    lat: Vec<f64>,
    values: GridField<f64>,
    periodic: bool,
    /// Offset from target longitudes to window longitudes when not periodic
    frame_shift: f64,
}

impl RasterWindow {
    fn to_window_x(&self, x: f64) -> f64 {
        if self.periodic {
            self.lon[0] + (x - self.lon[0]).rem_euclid(360.0)
        } else {
            x + self.frame_shift
        }
    }
}

/// Index of the last axis value `<= v`, clamped to the axis.
fn lower_index(axis: &[f64], v: f64) -> usize {
    axis.partition_point(|&a| a <= v).saturating_sub(1)
}

/// Index of the first axis value `>= v`, clamped to the axis.
fn upper_index(axis: &[f64], v: f64) -> usize {
    axis.partition_point(|&a| a < v).min(axis.len().saturating_sub(1))
}

/// Index of the axis value closest to `v`.
fn nearest_index(axis: &[f64], v: f64) -> usize {
    let hi = upper_index(axis, v);
    let lo = lower_index(axis, v);
    if (axis[lo] - v).abs() <= (axis[hi] - v).abs() {
        lo
    } else {
        hi
    }
}

fn load_window<R: RasterSource + ?Sized>(
    raster: &R,
    extent: &BoundingBox,
    spacing: (f64, f64),
) -> GridGenResult<RasterWindow> {
    let lon_b = raster.lon();
    let lat_b = raster.lat();
    let (dx_base, dy_base) = raster.resolution();
    if lon_b.len() < 2 || lat_b.len() < 2 || dx_base <= 0.0 || dy_base <= 0.0 {
        return Err(GridGenError::data("bathymetry raster has fewer than 2 nodes per axis"));
    }
    let n = lon_b.len();
    let margin_x = WINDOW_MARGIN_CELLS * spacing.0;
    let margin_y = WINDOW_MARGIN_CELLS * spacing.1;

    // Latitude
    let lat_tol = 0.5 * dy_base;
    if extent.min_y < lat_b[0] - lat_tol || extent.max_y > lat_b[lat_b.len() - 1] + lat_tol {
        return Err(GridGenError::coordinate(format!(
            "target latitude [{}, {}] outside raster [{}, {}]",
            extent.min_y,
            extent.max_y,
            lat_b[0],
            lat_b[lat_b.len() - 1]
        )));
    }
    let r0 = lower_index(lat_b, extent.min_y - margin_y);
    let r1 = upper_index(lat_b, extent.max_y + margin_y);
    let rows = r0..r1 + 1;

    // Longitude: list of (raster column, longitude shift)
    let periodic = lon_b[n - 1] - lon_b[0] + dx_base >= 360.0 - 1.0e-6;
    let mut frame_shift = 0.0;
    let mut cols: Vec<(usize, f64)> = Vec::new();

    if periodic {
        let span = extent.width() + 2.0 * margin_x;
        if span + dx_base >= 360.0 {
            let ext = ((margin_x / dx_base).ceil() as usize + 1).min(n);
            cols.extend((n - ext..n).map(|c| (c, -360.0)));
            cols.extend((0..n).map(|c| (c, 0.0)));
            cols.extend((0..ext).map(|c| (c, 360.0)));
        } else {
            let a = extent.min_x - margin_x;
            let a_r = lon_b[0] + (a - lon_b[0]).rem_euclid(360.0);
            let i0 = lower_index(lon_b, a_r);
            let ncols = ((span / dx_base).ceil() as usize + 3).min(2 * n);
            let first = i0..(i0 + ncols).min(n);
            let rest = ncols - first.len();
            cols.extend(first.map(|c| (c, 0.0)));
            if rest > 0 {
                debug!(start = i0, wrapped = rest, "Raster window wraps across the seam");
                cols.extend((0..rest.min(n)).map(|c| (c, 360.0)));
            }
        }
    } else {
        let lo = lon_b[0] - LON_TOLERANCE;
        let hi = lon_b[n - 1] + LON_TOLERANCE;
        let shift = [0.0, -360.0, 360.0]
            .into_iter()
            .find(|s| extent.min_x + s >= lo && extent.max_x + s <= hi)
            .ok_or_else(|| {
                GridGenError::coordinate(format!(
                    "target longitude [{}, {}] outside raster [{}, {}]",
                    extent.min_x,
                    extent.max_x,
                    lon_b[0],
                    lon_b[n - 1]
                ))
            })?;
        frame_shift = shift;
        let c0 = lower_index(lon_b, extent.min_x + shift - margin_x);
        let c1 = upper_index(lon_b, extent.max_x + shift + margin_x);
        cols.extend((c0..c1 + 1).map(|c| (c, 0.0)));
    }

    // Repeated longitudes (axes holding both -180 and 180) keep the first column.
    let mut deduped: Vec<(usize, f64)> = Vec::with_capacity(cols.len());
    for (c, s) in cols {
        let x = lon_b[c] + s;
        if deduped
            .last()
            .is_some_and(|&(pc, ps)| x <= lon_b[pc] + ps + 1.0e-9)
        {
            continue;
        }
        deduped.push((c, s));
    }

    if rows.is_empty() || deduped.is_empty() {
        return Err(GridGenError::data("empty bathymetry window"));
    }

    let values = read_pieces(raster, rows.clone(), &deduped)?;
    let lon = deduped.iter().map(|&(c, s)| lon_b[c] + s).collect();
    let lat = lat_b[rows.clone()].to_vec();

    debug!(
        rows = ?rows,
        columns = deduped.len(),
        periodic,
        "Loaded raster window"
    );

    Ok(RasterWindow {
        lon,
        lat,
        values,
        periodic,
        frame_shift,
    })
}

/// Read the columns as contiguous pieces and stitch them side by side.
fn read_pieces<R: RasterSource + ?Sized>(
    raster: &R,
    rows: Range<usize>,
    cols: &[(usize, f64)],
) -> GridGenResult<GridField<f64>> {
    let ny = rows.len();
    let nx = cols.len();
    let mut out = GridField::filled(nx, ny, f64::NAN);

    let mut start = 0;
    while start < nx {
        let mut end = start + 1;
        while end < nx && cols[end].0 == cols[end - 1].0 + 1 && cols[end].1 == cols[start].1 {
            end += 1;
        }
        let piece = raster.read_window(rows.clone(), cols[start].0..cols[end - 1].0 + 1)?;
        if piece.is_empty() || piece.nx != end - start || piece.ny != ny {
            return Err(GridGenError::data(format!(
                "raster returned a {}x{} window, expected {}x{}",
                piece.ny,
                piece.nx,
                ny,
                end - start
            )));
        }
        for k in 0..ny {
            for (offset, j) in (start..end).enumerate() {
                out[(k, j)] = piece[(k, offset)];
            }
        }
        start = end;
    }
    Ok(out)
}

fn bilinear(window: &RasterWindow, x: f64, y: f64, params: &ResampleParams) -> f64 {
    let nx = window.lon.len();
    let ny = window.lat.len();
    let i = lower_index(&window.lon, x).min(nx.saturating_sub(2));
    let r = lower_index(&window.lat, y).min(ny.saturating_sub(2));
    if nx < 2 || ny < 2 {
        let v = window.values[(r, i)];
        return if v.is_nan() || v >= params.cut_off { params.dry_val } else { v };
    }

    let dx_base = window.lon[i + 1] - window.lon[i];
    let dy_base = window.lat[r + 1] - window.lat[r];
    let dx1 = (x - window.lon[i]).abs();
    let dx2 = dx_base - dx1;
    let dy1 = (y - window.lat[r]).abs();
    let dy2 = dy_base - dy1;

    let a11 = window.values[(r, i)];
    let a12 = window.values[(r, i + 1)];
    let a21 = window.values[(r + 1, i)];
    let a22 = window.values[(r + 1, i + 1)];

    let v = (a11 * dy2 * dx2 + a12 * dy2 * dx1 + a21 * dy1 * dx2 + a22 * dy1 * dx1)
        / (dx_base * dy_base);
    if v.is_nan() || v >= params.cut_off {
        params.dry_val
    } else {
        v
    }
}

fn axis_span(axis: &[f64], lo: f64, hi: f64, center: f64) -> Range<usize> {
    let start = axis.partition_point(|&a| a < lo);
    let end = axis.partition_point(|&a| a <= hi);
    if start < end {
        start..end
    } else {
        let c = nearest_index(axis, center);
        c..c + 1
    }
}

fn area_average(window: &RasterWindow, cell: &BoundingBox, x: f64, y: f64, params: &ResampleParams) -> f64 {
    let cols = axis_span(&window.lon, cell.min_x, cell.max_x, x);
    let rows = axis_span(&window.lat, cell.min_y, cell.max_y, y);

    let mut n_total = 0usize;
    let mut n_water = 0usize;
    let mut sum = 0.0;
    for r in rows {
        for v in &window.values.row(r)[cols.clone()] {
            // missing nodes count toward the footprint but never as water
            n_total += 1;
            if *v < params.cut_off {
                n_water += 1;
                sum += v;
            }
        }
    }

    if n_total == 0 || n_water == 0 {
        return params.dry_val;
    }
    let ratio = n_water as f64 / n_total as f64;
    if ratio > params.lim_bathy {
        sum / n_water as f64
    } else {
        params.dry_val
    }
}

/// Resample `raster` onto the nodes of `coords`.
///
/// Returns `depth[Ny, Nx]` holding raster elevations (negative below sea
/// level) for wet cells and `params.dry_val` elsewhere.
pub fn generate_grid<R: RasterSource + ?Sized>(
    coords: &GridCoords,
    raster: &R,
    params: &ResampleParams,
) -> GridGenResult<GridField<f64>> {
    let nx = coords.nx();
    let ny = coords.ny();
    let extent = coords.bbox();
    let spacing = coords.spacing();
    let (dx_base, dy_base) = raster.resolution();

    info!(
        nx,
        ny,
        raster_nx = raster.lon().len(),
        raster_ny = raster.lat().len(),
        dx_base,
        dy_base,
        "Resampling bathymetry"
    );

    match raster.lon_convention() {
        LonConvention::Signed if extent.max_x > 180.0 => {
            info!("Target longitudes above 180 sampled at lon - 360");
        }
        LonConvention::Positive if extent.min_x < 0.0 => {
            info!("Target longitudes below 0 sampled at lon + 360");
        }
        _ => {}
    }
    if let Some((lo, hi)) = raster.actual_range() {
        debug!(min = lo, max = hi, "Raster elevation range");
    }

    let window = load_window(raster, &extent, spacing)?;

    let rows: Vec<Vec<f64>> = (0..ny)
        .into_par_iter()
        .map(|k| {
            (0..nx)
                .map(|j| {
                    let corners = cell_corners(&coords.lon, &coords.lat, k, j);
                    let x = coords.lon[(k, j)];
                    let y = coords.lat[(k, j)];
                    let xw = window.to_window_x(x);
                    let ndx = (corners.width / dx_base).round();
                    let ndy = (corners.height / dy_base).round();
                    if ndx <= 1.0 && ndy <= 1.0 {
                        bilinear(&window, xw, y, params)
                    } else {
                        let cell = corners.shifted_x(xw - x).bbox();
                        area_average(&window, &cell, xw, y, params)
                    }
                })
                .collect()
        })
        .collect();

    let depth = GridField::from_vec(nx, ny, rows.into_iter().flatten().collect())?;
    let wet = depth.data.iter().filter(|&&d| d != params.dry_val).count();
    info!(wet, dry = depth.len() - wet, "Bathymetry resampled");
    Ok(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridgen_common::MemoryRaster;

    fn axis(start: f64, end: f64, step: f64) -> Vec<f64> {
        let n = ((end - start) / step).round() as usize + 1;
        (0..n).map(|i| start + i as f64 * step).collect()
    }

    #[test]
    fn test_index_helpers() {
        let a = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(lower_index(&a, 1.5), 1);
        assert_eq!(lower_index(&a, -4.0), 0);
        assert_eq!(upper_index(&a, 1.5), 2);
        assert_eq!(upper_index(&a, 9.0), 3);
        assert_eq!(nearest_index(&a, 2.4), 2);
    }

    #[test]
    fn test_flat_ocean_is_averaged() {
        let raster =
            MemoryRaster::from_fn(axis(-10.0, 10.0, 0.1), axis(-10.0, 10.0, 0.1), |_, _| -100.0)
                .unwrap();
        let coords = GridCoords::from_axes(&[0.0, 1.0], &[0.0, 1.0]);
        let depth = generate_grid(&coords, &raster, &ResampleParams::default()).unwrap();
        assert!(depth.data.iter().all(|&d| (d + 100.0).abs() < 1e-9));
    }

    #[test]
    fn test_bilinear_fine_grid() {
        // elevation = -x on a 1° raster, sampled at 0.5°
        let raster =
            MemoryRaster::from_fn(axis(0.0, 10.0, 1.0), axis(0.0, 10.0, 1.0), |x, _| -x - 1.0)
                .unwrap();
        let coords = GridCoords::from_axes(&[2.0, 2.5, 3.0], &[4.0, 4.5]);
        let depth = generate_grid(&coords, &raster, &ResampleParams::default()).unwrap();
        assert!((depth[(0, 1)] + 3.5).abs() < 1e-9);
        assert!((depth[(1, 2)] + 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_land_is_dry() {
        let raster =
            MemoryRaster::from_fn(axis(0.0, 10.0, 0.25), axis(0.0, 10.0, 0.25), |_, _| 50.0)
                .unwrap();
        let coords = GridCoords::from_axes(&[3.0, 4.0], &[3.0, 4.0]);
        let params = ResampleParams::default();
        let depth = generate_grid(&coords, &raster, &params).unwrap();
        assert!(depth.data.iter().all(|&d| d == params.dry_val));
    }

    #[test]
    fn test_nan_window_is_dry() {
        let raster =
            MemoryRaster::from_fn(axis(0.0, 10.0, 0.25), axis(0.0, 10.0, 0.25), |_, _| f64::NAN)
                .unwrap();
        let coords = GridCoords::from_axes(&[3.0, 4.0], &[3.0, 4.0]);
        let depth = generate_grid(&coords, &raster, &ResampleParams::default()).unwrap();
        assert!(depth.data.iter().all(|&d| d == 999999.0));
    }

    #[test]
    fn test_missing_nodes_count_against_wet_fraction() {
        // 4 of the 5 footprint columns of the eastern cells are missing
        let raster = MemoryRaster::from_fn(axis(0.0, 10.0, 0.25), axis(0.0, 10.0, 0.25), |x, _| {
            if x < 4.3 {
                f64::NAN
            } else {
                -30.0
            }
        })
        .unwrap();
        let coords = GridCoords::from_axes(&[3.0, 4.0], &[3.0, 4.0]);

        let strict = ResampleParams {
            lim_bathy: 0.5,
            ..ResampleParams::default()
        };
        let depth = generate_grid(&coords, &raster, &strict).unwrap();
        assert_eq!(depth[(0, 1)], strict.dry_val);
        assert_eq!(depth[(1, 1)], strict.dry_val);

        let depth = generate_grid(&coords, &raster, &ResampleParams::default()).unwrap();
        assert!((depth[(0, 1)] + 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_latitude_outside_raster() {
        let raster =
            MemoryRaster::from_fn(axis(0.0, 10.0, 1.0), axis(0.0, 10.0, 1.0), |_, _| -1.0).unwrap();
        let coords = GridCoords::from_axes(&[1.0, 2.0], &[20.0, 21.0]);
        let err = generate_grid(&coords, &raster, &ResampleParams::default()).unwrap_err();
        assert_eq!(err.kind(), "coordinate");
    }

    #[test]
    fn test_target_beyond_180_on_signed_raster() {
        // west of the seam -10 m, east of it -20 m
        let raster = MemoryRaster::from_fn(axis(-180.0, 179.5, 0.5), axis(-5.0, 5.0, 0.5), |x, _| {
            if x > 0.0 {
                -10.0
            } else {
                -20.0
            }
        })
        .unwrap();
        let coords = GridCoords::from_axes(&[176.0, 178.0, 182.0, 184.0], &[0.0, 2.0]);
        let depth = generate_grid(&coords, &raster, &ResampleParams::default()).unwrap();
        assert!((depth[(0, 0)] + 10.0).abs() < 1e-9);
        assert!((depth[(0, 3)] + 20.0).abs() < 1e-9);
    }
}
