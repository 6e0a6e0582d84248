//! Sub-grid obstruction coefficients.
//!
//! Each wet cell collects, per axis, the fractional extent of every shoreline
//! polygon whose vertices fall inside it, measured in the cell's own rotated
//! frame. Segments are then merged across neighbors, de-overlapped, reduced by
//! what neighboring cells already block, and summed into `sx` / `sy`.
//!
//! The vertex extraction is the only expensive stage and runs on the rayon
//! pool one grid row per task. Everything after it needs neighbor state and is
//! sequential.

use std::collections::{BTreeMap, HashMap};

use gridgen_common::{BoundarySet, BoundingBox, FlatBoundary, GridCoords, GridField, GridGenError, GridGenResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::geometry::{cell_corners, point_in_polygon, CellCorners, Point};

/// Growth of the candidate box around a cell, relative to its larger side.
const CANDIDATE_PAD: f64 = 0.1;

/// Inclusion radius of the cell test, relative to its larger side.
const CELL_RADIUS: f64 = 1.0e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstructionParams {
    /// How many western (x) / southern (y) neighbors shadow a cell.
    pub offset_left: usize,
    /// How many eastern (x) / northern (y) neighbors shadow a cell.
    pub offset_right: usize,
    /// Neighbor lookups wrap in longitude.
    pub wrap_x: bool,
}

impl ObstructionParams {
    /// Both offsets set to `obstr_offset`.
    pub fn symmetric(obstr_offset: usize, wrap_x: bool) -> Self {
        Self {
            offset_left: obstr_offset,
            offset_right: obstr_offset,
            wrap_x,
        }
    }
}

/// Fractional extent `[lo, hi]` of one polygon along a cell axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub poly: usize,
    pub lo: f64,
    pub hi: f64,
}

impl Segment {
    pub fn new(poly: usize, lo: f64, hi: f64) -> Self {
        Self { poly, lo, hi }
    }

    pub fn length(&self) -> f64 {
        self.hi - self.lo
    }

    fn overlaps(&self, other: &Segment) -> bool {
        self.lo <= other.hi && other.lo <= self.hi
    }

    fn covers(&self, other: &Segment) -> bool {
        self.lo <= other.lo && self.hi >= other.hi
    }
}

/// Segments gathered for one wet cell.
#[derive(Debug, Clone, Default)]
pub struct CellSegments {
    /// Distinct polygons with a vertex inside the cell.
    pub nbnds: usize,
    /// North-south extents, blocking flow along x.
    pub x: Vec<Segment>,
    /// East-west extents, blocking flow along y.
    pub y: Vec<Segment>,
}

/// Obstruction coefficients and the per-cell boundary presence count.
#[derive(Debug, Clone)]
pub struct Obstructions {
    pub sx: GridField<f64>,
    pub sy: GridField<f64>,
    pub nbnds: GridField<usize>,
}

impl Obstructions {
    pub fn zeros(nx: usize, ny: usize) -> Self {
        Self {
            sx: GridField::filled(nx, ny, 0.0),
            sy: GridField::filled(nx, ny, 0.0),
            nbnds: GridField::filled(nx, ny, 0),
        }
    }
}

/// Spatial hash of boundary vertices.
struct VertexIndex {
    size: f64,
    buckets: HashMap<(i64, i64), Vec<usize>>,
}

impl VertexIndex {
    fn build(flat: &FlatBoundary, size: f64) -> Self {
        let mut buckets: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (i, (&x, &y)) in flat.x.iter().zip(&flat.y).enumerate() {
            buckets
                .entry(((x / size).floor() as i64, (y / size).floor() as i64))
                .or_default()
                .push(i);
        }
        Self { size, buckets }
    }

    /// Vertex indices inside `bbox`, ascending.
    fn query(&self, flat: &FlatBoundary, bbox: &BoundingBox) -> Vec<usize> {
        let bx0 = (bbox.min_x / self.size).floor() as i64;
        let bx1 = (bbox.max_x / self.size).floor() as i64;
        let by0 = (bbox.min_y / self.size).floor() as i64;
        let by1 = (bbox.max_y / self.size).floor() as i64;

        let mut out = Vec::new();
        for bx in bx0..=bx1 {
            for by in by0..=by1 {
                if let Some(ids) = self.buckets.get(&(bx, by)) {
                    out.extend(
                        ids.iter()
                            .copied()
                            .filter(|&i| bbox.contains_point(flat.x[i], flat.y[i])),
                    );
                }
            }
        }
        out.sort_unstable();
        out
    }
}

fn is_degenerate(corners: &CellCorners) -> bool {
    !(corners.width.is_finite() && corners.height.is_finite())
        || corners.width <= 0.0
        || corners.height <= 0.0
}

/// Extract the segments of one cell from the vertices that fall inside it.
fn cell_segments(corners: &CellCorners, flat: &FlatBoundary, index: &VertexIndex) -> CellSegments {
    let cell_box = corners.bbox();
    let side = corners.width.max(corners.height);
    let candidates = index.query(flat, &cell_box.expand(CANDIDATE_PAD * side));
    if candidates.is_empty() {
        return CellSegments::default();
    }

    let (qx, qy) = corners.ring();
    let radius = CELL_RADIUS * side;
    let mut by_poly: BTreeMap<usize, Vec<Point>> = BTreeMap::new();
    for i in candidates {
        let p = Point::new(flat.x[i], flat.y[i]);
        if point_in_polygon(&qx, &qy, p, radius) {
            by_poly.entry(flat.poly[i]).or_default().push(p);
        }
    }

    let origin = corners.c4;
    let angle = (corners.c1.y - origin.y).atan2(corners.c1.x - origin.x);
    let (sin, cos) = angle.sin_cos();

    let mut out = CellSegments {
        nbnds: by_poly.len(),
        ..CellSegments::default()
    };
    for (poly, points) in by_poly {
        if !flat.bboxes[poly].intersects(&cell_box) {
            continue;
        }
        let (mut xmin, mut xmax) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut ymin, mut ymax) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            let (dx, dy) = (p.x - origin.x, p.y - origin.y);
            let xt = dx * cos + dy * sin;
            let yt = -dx * sin + dy * cos;
            xmin = xmin.min(xt);
            xmax = xmax.max(xt);
            ymin = ymin.min(yt);
            ymax = ymax.max(yt);
        }
        let frac = |v: f64, len: f64| (v / len).clamp(0.0, 1.0);
        out.x.push(Segment::new(
            poly,
            frac(ymin, corners.height),
            frac(ymax, corners.height),
        ));
        out.y.push(Segment::new(
            poly,
            frac(xmin, corners.width),
            frac(xmax, corners.width),
        ));
    }
    out
}

/// Merge the first polygon shared by two neighboring cells into the one with
/// the longer segment.
fn merge_shared(a: &mut Vec<Segment>, b: &mut Vec<Segment>) {
    let shared = a
        .iter()
        .enumerate()
        .find_map(|(ia, sa)| b.iter().position(|sb| sb.poly == sa.poly).map(|ib| (ia, ib)));
    let Some((ia, ib)) = shared else {
        return;
    };
    let union = Segment::new(a[ia].poly, a[ia].lo.min(b[ib].lo), a[ia].hi.max(b[ib].hi));
    if a[ia].length() >= b[ib].length() {
        a[ia] = union;
        b.remove(ib);
    } else {
        b[ib] = union;
        a.remove(ia);
    }
}

/// Collapse overlapping intervals until they are pairwise disjoint.
pub fn merge_overlaps(mut segments: Vec<Segment>) -> Vec<Segment> {
    segments.sort_by(|a, b| a.lo.total_cmp(&b.lo));
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
    for s in segments {
        match out.last_mut() {
            Some(last) if last.overlaps(&s) => last.hi = last.hi.max(s.hi),
            _ => out.push(s),
        }
    }
    out
}

/// Sum a cell's segments after removing what its neighbors already block.
///
/// `neighbors` are visited in order. The result is zero as soon as every
/// segment of the cell is shadowed.
pub fn shadowed_sum(own: &[Segment], neighbors: &[&[Segment]]) -> f64 {
    let mut work = own.to_vec();
    if work.is_empty() {
        return 0.0;
    }
    for nb in neighbors {
        work.retain(|w| !nb.iter().any(|s| s.covers(w)));
        if work.is_empty() {
            return 0.0;
        }
        let survivors: Vec<Segment> = nb
            .iter()
            .filter(|s| !work.iter().any(|w| w.covers(s)))
            .copied()
            .collect();
        work.extend(survivors);
    }
    merge_overlaps(work)
        .iter()
        .map(Segment::length)
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

/// Column `j + delta`, wrapping when `wrap` is set.
fn shift_col(j: usize, delta: isize, nx: usize, wrap: bool) -> Option<usize> {
    let t = j as isize + delta;
    if (0..nx as isize).contains(&t) {
        Some(t as usize)
    } else if wrap {
        Some(t.rem_euclid(nx as isize) as usize)
    } else {
        None
    }
}

fn shift_row(k: usize, delta: isize, ny: usize) -> Option<usize> {
    let t = k as isize + delta;
    (0..ny as isize).contains(&t).then_some(t as usize)
}

/// Zero the obstruction of dry cells, and of wet cells with a dry direct
/// neighbor along the same axis.
pub fn zero_dry_neighbors(
    sx: &mut GridField<f64>,
    sy: &mut GridField<f64>,
    mask: &GridField<u8>,
    wrap_x: bool,
) {
    let (nx, ny) = (mask.nx, mask.ny);
    let mut zeroed = 0usize;
    for k in 0..ny {
        for j in 0..nx {
            if mask[(k, j)] == 0 {
                sx[(k, j)] = 0.0;
                sy[(k, j)] = 0.0;
                continue;
            }
            let dry_x = [-1, 1]
                .into_iter()
                .filter_map(|d| shift_col(j, d, nx, wrap_x))
                .any(|jj| mask[(k, jj)] == 0);
            let dry_y = [-1, 1]
                .into_iter()
                .filter_map(|d| shift_row(k, d, ny))
                .any(|kk| mask[(kk, j)] == 0);
            if dry_x && sx[(k, j)] != 0.0 {
                sx[(k, j)] = 0.0;
                zeroed += 1;
            }
            if dry_y && sy[(k, j)] != 0.0 {
                sy[(k, j)] = 0.0;
                zeroed += 1;
            }
        }
    }
    debug!(zeroed, "Obstructions cancelled next to dry cells");
}

/// Compute `sx` / `sy` for every cell of the grid.
pub fn create_obstr(
    coords: &GridCoords,
    boundaries: &BoundarySet,
    mask: &GridField<u8>,
    params: &ObstructionParams,
) -> GridGenResult<Obstructions> {
    let (nx, ny) = (coords.nx(), coords.ny());
    if mask.nx != nx || mask.ny != ny {
        return Err(GridGenError::data(format!(
            "mask is {}x{} but the grid is {}x{}",
            mask.nx, mask.ny, nx, ny
        )));
    }
    let mut result = Obstructions::zeros(nx, ny);
    if boundaries.is_empty() || nx == 0 || ny == 0 {
        info!("No boundary polygons, obstructions are zero");
        return Ok(result);
    }

    let flat = boundaries.flatten();
    let (dx, dy) = coords.spacing();
    let bucket = match dx.max(dy) {
        s if s > 0.0 => s,
        _ => 1.0,
    };
    let index = VertexIndex::build(&flat, bucket);
    info!(
        nx,
        ny,
        polygons = boundaries.len(),
        vertices = flat.len(),
        "Extracting obstruction segments"
    );

    // Stage A
    let rows: Vec<Vec<CellSegments>> = (0..ny)
        .into_par_iter()
        .map(|k| {
            (0..nx)
                .map(|j| {
                    if mask[(k, j)] == 0 {
                        return CellSegments::default();
                    }
                    let corners = cell_corners(&coords.lon, &coords.lat, k, j);
                    if is_degenerate(&corners) {
                        debug!(k, j, "Degenerate cell, no obstruction");
                        return CellSegments::default();
                    }
                    cell_segments(&corners, &flat, &index)
                })
                .collect()
        })
        .collect();
    let mut cells: Vec<CellSegments> = rows.into_iter().flatten().collect();
    for (n, cell) in result.nbnds.data.iter_mut().zip(&cells) {
        *n = cell.nbnds;
    }

    // Stage B
    let idx = |k: usize, j: usize| k * nx + j;
    for k in 0..ny {
        for j in 0..nx.saturating_sub(1) {
            let (left, right) = cells.split_at_mut(idx(k, j + 1));
            merge_shared(&mut left[idx(k, j)].x, &mut right[0].x);
        }
    }
    for k in 0..ny.saturating_sub(1) {
        for j in 0..nx {
            let (lower, upper) = cells.split_at_mut(idx(k + 1, j));
            merge_shared(&mut lower[idx(k, j)].y, &mut upper[0].y);
        }
    }

    // Stage C
    for cell in cells.iter_mut() {
        cell.x = merge_overlaps(std::mem::take(&mut cell.x));
        cell.y = merge_overlaps(std::mem::take(&mut cell.y));
    }

    // Stage D
    let left = params.offset_left as isize;
    let right = params.offset_right as isize;
    for k in 0..ny {
        for j in 0..nx {
            if mask[(k, j)] == 0 {
                continue;
            }
            let cell = &cells[idx(k, j)];
            if !cell.x.is_empty() {
                let neighbors: Vec<&[Segment]> = (1..=left)
                    .map(|off| -off)
                    .chain(1..=right)
                    .filter_map(|d| shift_col(j, d, nx, params.wrap_x))
                    .map(|jj| cells[idx(k, jj)].x.as_slice())
                    .collect();
                result.sx[(k, j)] = shadowed_sum(&cell.x, &neighbors);
            }
            if !cell.y.is_empty() {
                let neighbors: Vec<&[Segment]> = (1..=left)
                    .map(|off| -off)
                    .chain(1..=right)
                    .filter_map(|d| shift_row(k, d, ny))
                    .map(|kk| cells[idx(kk, j)].y.as_slice())
                    .collect();
                result.sy[(k, j)] = shadowed_sum(&cell.y, &neighbors);
            }
        }
    }

    // Stage E
    zero_dry_neighbors(&mut result.sx, &mut result.sy, mask, params.wrap_x);

    let blocked = result
        .sx
        .data
        .iter()
        .zip(&result.sy.data)
        .filter(|(x, y)| **x > 0.0 || **y > 0.0)
        .count();
    info!(
        boundary_cells = result.nbnds.data.iter().filter(|&&n| n > 0).count(),
        blocked,
        "Obstructions computed"
    );
    Ok(result)
}
