//! Synthetic bathymetry rasters and shoreline polygons.
//!
//! Values are simple closed forms so expected depths, coverage fractions and
//! clipped areas can be worked out by hand.

use gridgen_common::{MemoryRaster, Polygon, PolygonLevel};

/// Evenly spaced axis from `start` to `end` inclusive.
///
/// # Example
///
/// ```
/// use test_utils::axis;
///
/// assert_eq!(axis(0.0, 1.0, 0.25), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// ```
pub fn axis(start: f64, end: f64, step: f64) -> Vec<f64> {
    let n = ((end - start) / step).round() as usize + 1;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Raster of constant elevation over `[w, e] × [s, n]`.
pub fn constant_raster(lon: [f64; 2], lat: [f64; 2], step: f64, elevation: f64) -> MemoryRaster {
    MemoryRaster::from_fn(axis(lon[0], lon[1], step), axis(lat[0], lat[1], step), |_, _| elevation)
        .expect("constant raster")
}

/// Raster that is `west` below `split_lon` and `east` from it on.
pub fn split_raster(
    lon: [f64; 2],
    lat: [f64; 2],
    step: f64,
    split_lon: f64,
    west: f64,
    east: f64,
) -> MemoryRaster {
    MemoryRaster::from_fn(axis(lon[0], lon[1], step), axis(lat[0], lat[1], step), |x, _| {
        if x < split_lon {
            west
        } else {
            east
        }
    })
    .expect("split raster")
}

/// Raster whose elevation rises linearly with longitude: `slope * (x - x0)`.
pub fn sloping_raster(lon: [f64; 2], lat: [f64; 2], step: f64, x0: f64, slope: f64) -> MemoryRaster {
    MemoryRaster::from_fn(axis(lon[0], lon[1], step), axis(lat[0], lat[1], step), |x, _| {
        slope * (x - x0)
    })
    .expect("sloping raster")
}

/// Closed counter-clockwise rectangle.
pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64, level: u8) -> Polygon {
    Polygon::new(
        vec![x0, x1, x1, x0, x0],
        vec![y0, y0, y1, y1, y0],
        level,
    )
}

/// Closed counter-clockwise land polygon approximating a circle.
pub fn circle_island(cx: f64, cy: f64, radius: f64, n: usize) -> Polygon {
    let n = n.max(3);
    let mut x = Vec::with_capacity(n + 1);
    let mut y = Vec::with_capacity(n + 1);
    for i in 0..n {
        let t = std::f64::consts::TAU * i as f64 / n as f64;
        x.push(cx + radius * t.cos());
        y.push(cy + radius * t.sin());
    }
    x.push(x[0]);
    y.push(y[0]);
    Polygon::new(x, y, PolygonLevel::LAND)
}

/// Closed star-shaped land polygon alternating between two radii; gives
/// many boundary crossings when clipped.
pub fn star_island(cx: f64, cy: f64, r_inner: f64, r_outer: f64, points: usize) -> Polygon {
    let n = 2 * points.max(3);
    let mut x = Vec::with_capacity(n + 1);
    let mut y = Vec::with_capacity(n + 1);
    for i in 0..n {
        let t = std::f64::consts::TAU * i as f64 / n as f64;
        let r = if i % 2 == 0 { r_outer } else { r_inner };
        x.push(cx + r * t.cos());
        y.push(cy + r * t.sin());
    }
    x.push(x[0]);
    y.push(y[0]);
    Polygon::new(x, y, PolygonLevel::LAND)
}

/// Append one GSHHS record (big-endian header plus micro-degree points) to
/// `buf`. The bounding box is derived from the points.
pub fn push_gshhs_record(buf: &mut Vec<u8>, id: i32, flag: i32, points_deg: &[(f64, f64)]) {
    let to_micro = |v: f64| (v * 1.0e6).round() as i32;
    let xs: Vec<i32> = points_deg.iter().map(|p| to_micro(p.0)).collect();
    let ys: Vec<i32> = points_deg.iter().map(|p| to_micro(p.1)).collect();
    let west = xs.iter().copied().min().unwrap_or(0);
    let east = xs.iter().copied().max().unwrap_or(0);
    let south = ys.iter().copied().min().unwrap_or(0);
    let north = ys.iter().copied().max().unwrap_or(0);

    let header = [id, xs.len() as i32, flag, west, east, south, north, 100, 100, -1, -1];
    for v in header {
        buf.extend_from_slice(&v.to_be_bytes());
    }
    for (x, y) in xs.iter().zip(&ys) {
        buf.extend_from_slice(&x.to_be_bytes());
        buf.extend_from_slice(&y.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridgen_common::RasterSource;

    #[test]
    fn test_axis_endpoints() {
        let a = axis(-1.0, 1.0, 0.5);
        assert_eq!(a.len(), 5);
        assert_eq!(a[0], -1.0);
        assert_eq!(a[4], 1.0);
    }

    #[test]
    fn test_split_raster_values() {
        let r = split_raster([0.0, 1.0], [0.0, 1.0], 0.5, 0.5, -50.0, 50.0);
        let w = r.read_window(0..3, 0..3).unwrap();
        assert_eq!(w.row(0), &[-50.0, 50.0, 50.0]);
    }

    #[test]
    fn test_polygons_are_ccw_and_closed() {
        for p in [rectangle(0.0, 0.0, 2.0, 1.0, 1), circle_island(0.0, 0.0, 1.0, 16), star_island(0.0, 0.0, 0.5, 1.0, 5)] {
            assert!(p.is_closed());
            let (x, y) = p.open_ring();
            let area2: f64 = (0..x.len())
                .map(|i| {
                    let i1 = (i + 1) % x.len();
                    x[i] * y[i1] - x[i1] * y[i]
                })
                .sum();
            assert!(area2 > 0.0);
        }
    }

    #[test]
    fn test_gshhs_record_layout() {
        let mut buf = Vec::new();
        push_gshhs_record(&mut buf, 7, 1, &[(1.0, 2.0), (3.0, 2.0), (3.0, 4.0)]);
        assert_eq!(buf.len(), 44 + 3 * 8);
        assert_eq!(&buf[0..4], &7i32.to_be_bytes());
        assert_eq!(&buf[4..8], &3i32.to_be_bytes());
        assert_eq!(&buf[12..16], &1_000_000i32.to_be_bytes());
    }
}
