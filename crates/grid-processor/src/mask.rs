//! Land/sea mask construction and cleaning.
//!
//! The initial mask marks every cell with a resampled depth as wet. Cleaning
//! then dries wet cells whose area is mostly covered by shoreline polygons,
//! using an 8×8 sample pattern per cell that is cached across polygons so a
//! cell straddling several tiles of the same landmass accumulates coverage.

use std::collections::HashMap;

use gridgen_common::{BoundarySet, GridCoords, GridField};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::geometry::{cell_corners, point_in_polygon, Point, PIP_RADIUS};

/// Samples per cell along each axis.
const SAMPLES_PER_AXIS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskCleanParams {
    /// Covered fraction at which a wet cell is dried.
    pub lim_val: f64,
    /// Padding (degrees) added around each polygon's bounding box when
    /// collecting candidate cells.
    pub offset: f64,
}

/// `1` where `depth != dry_val`, else `0`.
pub fn initial_mask(depth: &GridField<f64>, dry_val: f64) -> GridField<u8> {
    depth.map(|&d| u8::from(d != dry_val))
}

/// Sample points of one cell and whether each has been found inside land.
struct CellSamples {
    points: Vec<Point>,
    /// 0 untested or outside every polygon so far, 1 inside
    status: Vec<i8>,
}

impl CellSamples {
    fn new(coords: &GridCoords, k: usize, j: usize) -> Self {
        let corners = cell_corners(&coords.lon, &coords.lat, k, j);
        let bbox = corners.bbox();
        let (qx, qy) = corners.ring();
        let sx = bbox.width() / SAMPLES_PER_AXIS as f64;
        let sy = bbox.height() / SAMPLES_PER_AXIS as f64;

        let mut points = Vec::with_capacity(SAMPLES_PER_AXIS * SAMPLES_PER_AXIS);
        for a in 0..SAMPLES_PER_AXIS {
            for b in 0..SAMPLES_PER_AXIS {
                let p = Point::new(
                    bbox.min_x + (b as f64 + 0.5) * sx,
                    bbox.min_y + (a as f64 + 0.5) * sy,
                );
                if point_in_polygon(&qx, &qy, p, PIP_RADIUS) {
                    points.push(p);
                }
            }
        }
        let status = vec![0; points.len()];
        Self { points, status }
    }

    /// Fraction inside land, rounded to one decimal.
    fn covered(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        let inside = self.status.iter().filter(|&&s| s > 0).count();
        ((inside as f64 / self.points.len() as f64) * 10.0).round() / 10.0
    }
}

/// Dry wet cells covered by shoreline polygons.
///
/// Returns the number of cells dried. Candidates are taken along the first
/// row/column of `coords`, which assumes a rectilinear grid.
pub fn clean_mask(
    coords: &GridCoords,
    mask: &mut GridField<u8>,
    boundaries: &BoundarySet,
    params: &MaskCleanParams,
) -> usize {
    let lon_axis = coords.lon_axis().to_vec();
    let lat_axis = coords.lat_axis();
    let mut cache: HashMap<usize, CellSamples> = HashMap::new();
    let mut dried = 0usize;

    info!(
        polygons = boundaries.len(),
        wet = mask.data.iter().filter(|&&m| m == 1).count(),
        lim_val = params.lim_val,
        "Cleaning mask"
    );

    for (idx, polygon) in boundaries.iter().enumerate() {
        let padded = polygon.bbox().expand(params.offset);
        let j0 = lon_axis.partition_point(|&x| x < padded.min_x);
        let j1 = lon_axis.partition_point(|&x| x <= padded.max_x);
        let k0 = lat_axis.partition_point(|&y| y < padded.min_y);
        let k1 = lat_axis.partition_point(|&y| y <= padded.max_y);
        if j0 >= j1 || k0 >= k1 {
            continue;
        }

        let mut polygon_dried = 0usize;
        for k in k0..k1 {
            for j in j0..j1 {
                if mask[(k, j)] == 0 {
                    continue;
                }
                let flat = mask.flat_index(k, j);
                let cell = cache
                    .entry(flat)
                    .or_insert_with(|| CellSamples::new(coords, k, j));

                for (p, status) in cell.points.iter().zip(cell.status.iter_mut()) {
                    if *status <= 0 && point_in_polygon(&polygon.x, &polygon.y, *p, PIP_RADIUS) {
                        *status = 1;
                    }
                }

                if cell.covered() >= params.lim_val {
                    mask[(k, j)] = 0;
                    polygon_dried += 1;
                }
            }
        }
        if polygon_dried > 0 {
            debug!(polygon = idx, dried = polygon_dried, "Cells dried by polygon");
        }
        dried += polygon_dried;
    }

    info!(dried, "Mask cleaned");
    dried
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridgen_common::{BoundingBox, Polygon};

    #[test]
    fn test_initial_mask() {
        let depth = GridField::from_vec(3, 1, vec![-5.0, 999999.0, -0.2]).unwrap();
        let mask = initial_mask(&depth, 999999.0);
        assert_eq!(mask.data, vec![1, 0, 1]);
    }

    #[test]
    fn test_covered_rounding() {
        let mut cell = CellSamples {
            points: vec![Point::default(); 64],
            status: vec![0; 64],
        };
        for s in cell.status.iter_mut().take(30) {
            *s = 1;
        }
        // 30/64 = 0.47 rounds to 0.5
        assert_eq!(cell.covered(), 0.5);
    }

    #[test]
    fn test_fully_covered_cell_is_dried() {
        let coords = GridCoords::from_axes(&[0.0, 1.0, 2.0], &[0.0, 1.0]);
        let mut mask = GridField::filled(3, 2, 1u8);
        let land = Polygon::rectangle(&BoundingBox::new(1.4, -1.0, 3.0, 2.0), 1);
        let params = MaskCleanParams {
            lim_val: 0.5,
            offset: 1.0,
        };
        let dried = clean_mask(&coords, &mut mask, &BoundarySet::from(vec![land]), &params);
        // column 2 fully covered, column 1 covered 0.1/1.0 of its width
        assert_eq!(dried, 2);
        assert_eq!(mask.data, vec![1, 1, 0, 1, 1, 0]);
    }

    #[test]
    fn test_coverage_accumulates_across_tiles() {
        let coords = GridCoords::from_axes(&[0.0, 1.0], &[0.0, 1.0]);
        let mut mask = GridField::filled(2, 2, 1u8);
        // two halves of cell (0, 0), neither enough alone at lim_val 0.6
        let west = Polygon::rectangle(&BoundingBox::new(-0.5, -0.5, 0.0, 0.5), 1);
        let east = Polygon::rectangle(&BoundingBox::new(0.0, -0.5, 0.5, 0.5), 1);
        let params = MaskCleanParams {
            lim_val: 0.6,
            offset: 0.1,
        };
        clean_mask(&coords, &mut mask, &BoundarySet::from(vec![west, east]), &params);
        assert_eq!(mask[(0, 0)], 0);
        assert_eq!(mask[(1, 1)], 1);
    }
}
