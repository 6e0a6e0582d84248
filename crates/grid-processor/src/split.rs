//! Tiling of oversized clipped polygons.
//!
//! Large landmasses make the point-in-polygon tests of the mask cleaner slow
//! and their reassembly fragile. Any polygon wider or taller than the tile
//! limit is re-clipped against integer-aligned tiles.

use gridgen_common::{BoundarySet, BoundingBox, GridGenResult, PolygonLevel};
use tracing::{debug, info, warn};

use crate::clip::{clip_polygon, ClipOutcome, DomainBox};

/// Tile side for a split limit in degrees.
pub fn tile_step(lim: f64) -> f64 {
    if lim < 1.0 {
        1.0
    } else {
        lim.floor().max(1.0)
    }
}

/// Split every polygon larger than `lim` degrees on either axis into tiles.
pub fn split_boundary(boundaries: &BoundarySet, lim: f64, min_val: f64) -> GridGenResult<BoundarySet> {
    let step = tile_step(lim);
    let mut out = BoundarySet::new();
    let mut split = 0usize;

    for (idx, polygon) in boundaries.iter().enumerate() {
        if polygon.width() <= lim && polygon.height() <= lim {
            out.push(polygon.clone());
            continue;
        }
        split += 1;

        let x_start = polygon.west.floor();
        let y_start = polygon.south.floor();
        let nx = ((polygon.east - x_start) / step).ceil().max(1.0) as usize;
        let ny = ((polygon.north - y_start) / step).ceil().max(1.0) as usize;
        let before = out.len();

        for ty in 0..ny {
            for tx in 0..nx {
                let x0 = x_start + tx as f64 * step;
                let y0 = y_start + ty as f64 * step;
                let tile = DomainBox::new(&BoundingBox::new(x0, y0, x0 + step, y0 + step))?;
                match clip_polygon(&tile, polygon, min_val)? {
                    ClipOutcome::Outside => {}
                    ClipOutcome::Inside(p) | ClipOutcome::Covers(p) => out.push(p),
                    ClipOutcome::Pieces(pieces) => out.polygons.extend(pieces),
                    ClipOutcome::Skipped(reason) => {
                        warn!(polygon = idx, x0, y0, reason = %reason, "Skipping tile with unpaired crossings");
                    }
                }
            }
        }
        debug!(
            polygon = idx,
            level = PolygonLevel::describe(polygon.level),
            tiles = nx * ny,
            pieces = out.len() - before,
            "Polygon split"
        );
    }

    info!(
        input = boundaries.len(),
        output = out.len(),
        split,
        step,
        "Boundary split into tiles"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridgen_common::Polygon;

    #[test]
    fn test_tile_step() {
        assert_eq!(tile_step(0.25), 1.0);
        assert_eq!(tile_step(1.0), 1.0);
        assert_eq!(tile_step(5.7), 5.0);
    }

    #[test]
    fn test_small_polygons_pass_through() {
        let p = Polygon::rectangle(&BoundingBox::new(0.2, 0.2, 0.8, 0.8), 1);
        let out = split_boundary(&BoundarySet::from(vec![p.clone()]), 1.0, 4.0).unwrap();
        assert_eq!(out.polygons, vec![p]);
    }

    #[test]
    fn test_large_rectangle_split_into_tiles() {
        let p = Polygon::rectangle(&BoundingBox::new(0.0, 0.0, 3.0, 2.0), 1);
        let out = split_boundary(&BoundarySet::from(vec![p]), 1.0, 4.0).unwrap();
        assert_eq!(out.len(), 6);
        let total: f64 = out
            .iter()
            .map(|p| crate::geometry::signed_area(&p.x, &p.y))
            .sum();
        assert!((total - 6.0).abs() < 1e-9);
        assert!(out.iter().all(|p| p.width() <= 1.0 + 1e-12 && p.height() <= 1.0 + 1e-12));
    }

    #[test]
    fn test_vertices_on_tile_lines_keep_all_area() {
        // every vertex lies on a tile edge or corner
        let diamond = Polygon::new(
            vec![1.0, 2.0, 1.0, 0.0, 1.0],
            vec![0.0, 1.0, 2.0, 1.0, 0.0],
            PolygonLevel::LAND,
        );
        let out = split_boundary(&BoundarySet::from(vec![diamond]), 1.0, 4.0).unwrap();
        assert_eq!(out.len(), 4);
        let total: f64 = out
            .iter()
            .map(|p| crate::geometry::signed_area(&p.x, &p.y))
            .sum();
        assert!((total - 2.0).abs() < 1e-9);
    }
}
