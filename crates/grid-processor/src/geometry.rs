//! Planar geometry primitives in lon/lat degrees.
//!
//! Everything here is stateless and O(1) per call except the polygon tests,
//! which are linear in the ring length.

use gridgen_common::{BoundingBox, GridField};

/// Default inclusion radius for point-in-polygon tests.
pub const PIP_RADIUS: f64 = 1.0e-6;

/// Longitude difference beyond which a neighbor is taken to sit across the seam.
const SEAM_JUMP: f64 = 270.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new(0.5 * (self.x + other.x), 0.5 * (self.y + other.y))
    }
}

/// The four corners of a cell and its edge lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellCorners {
    /// Bottom-right
    pub c1: Point,
    /// Top-right
    pub c2: Point,
    /// Top-left
    pub c3: Point,
    /// Bottom-left
    pub c4: Point,
    pub width: f64,
    pub height: f64,
}

impl CellCorners {
    /// Counter-clockwise quadrilateral ring starting at the bottom-left corner,
    /// closed.
    pub fn ring(&self) -> ([f64; 5], [f64; 5]) {
        (
            [self.c4.x, self.c1.x, self.c2.x, self.c3.x, self.c4.x],
            [self.c4.y, self.c1.y, self.c2.y, self.c3.y, self.c4.y],
        )
    }

    pub fn bbox(&self) -> BoundingBox {
        let xs = [self.c1.x, self.c2.x, self.c3.x, self.c4.x];
        let ys = [self.c1.y, self.c2.y, self.c3.y, self.c4.y];
        BoundingBox::new(
            xs.iter().cloned().fold(f64::INFINITY, f64::min),
            ys.iter().cloned().fold(f64::INFINITY, f64::min),
            xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        )
    }

    /// Shift every corner along longitude.
    pub fn shifted_x(&self, dx: f64) -> CellCorners {
        let shift = |p: Point| Point::new(p.x + dx, p.y);
        CellCorners {
            c1: shift(self.c1),
            c2: shift(self.c2),
            c3: shift(self.c3),
            c4: shift(self.c4),
            ..*self
        }
    }
}

/// Field value at a possibly out-of-range node. Nodes past an edge are
/// mirrored through the edge node, one axis at a time.
fn virtual_node(field: &GridField<f64>, k: isize, j: isize) -> f64 {
    let ny = field.ny as isize;
    let nx = field.nx as isize;
    if k < 0 {
        return 2.0 * virtual_node(field, 0, j) - virtual_node(field, (-k).min(ny - 1), j);
    }
    if k >= ny {
        let mirror = (2 * (ny - 1) - k).max(0);
        return 2.0 * virtual_node(field, ny - 1, j) - virtual_node(field, mirror, j);
    }
    if j < 0 {
        return 2.0 * field[(k as usize, 0)] - field[(k as usize, (-j).min(nx - 1) as usize)];
    }
    if j >= nx {
        let mirror = (2 * (nx - 1) - j).max(0);
        return 2.0 * field[(k as usize, (nx - 1) as usize)] - field[(k as usize, mirror as usize)];
    }
    field[(k as usize, j as usize)]
}

/// Corners of cell `(k, j)` as midpoints of the diagonals to its four
/// diagonal neighbors.
///
/// Row `k` increases northward. Neighbors missing at the grid edge are
/// reflected about the edge node, which mirrors the interior-derived corner
/// about the cell center. A neighbor longitude more than 270° away from the
/// node is brought onto the node's side of the seam.
pub fn cell_corners(lon: &GridField<f64>, lat: &GridField<f64>, k: usize, j: usize) -> CellCorners {
    let (k, j) = (k as isize, j as isize);
    let center = Point::new(lon[(k as usize, j as usize)], lat[(k as usize, j as usize)]);

    let neighbor = |dk: isize, dj: isize| -> Point {
        let mut x = virtual_node(lon, k + dk, j + dj);
        let y = virtual_node(lat, k + dk, j + dj);
        if x - center.x > SEAM_JUMP {
            x -= 360.0;
        } else if center.x - x > SEAM_JUMP {
            x += 360.0;
        }
        center.midpoint(&Point::new(x, y))
    };

    let c1 = neighbor(-1, 1);
    let c2 = neighbor(1, 1);
    let c3 = neighbor(1, -1);
    let c4 = neighbor(-1, -1);

    CellCorners {
        c1,
        c2,
        c3,
        c4,
        width: c1.distance(&c4),
        height: c3.distance(&c4),
    }
}

/// Drop the closing vertex of a ring if present.
pub fn open_ring<'a>(x: &'a [f64], y: &'a [f64]) -> (&'a [f64], &'a [f64]) {
    let n = x.len().min(y.len());
    if n > 1 && x[0] == x[n - 1] && y[0] == y[n - 1] {
        (&x[..n - 1], &y[..n - 1])
    } else {
        (&x[..n], &y[..n])
    }
}

/// Distance from `p` to the segment `a`-`b`.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return p.distance(&a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    p.distance(&Point::new(a.x + t * dx, a.y + t * dy))
}

/// Ray-cast inclusion test. Points within `radius` of any edge count as
/// inside. The ring may be open or closed.
pub fn point_in_polygon(x: &[f64], y: &[f64], p: Point, radius: f64) -> bool {
    let (x, y) = open_ring(x, y);
    let n = x.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut i_prev = n - 1;
    for i in 0..n {
        let a = Point::new(x[i_prev], y[i_prev]);
        let b = Point::new(x[i], y[i]);

        if point_segment_distance(p, a, b) <= radius {
            return true;
        }
        if (b.y > p.y) != (a.y > p.y) {
            let x_cross = b.x + (p.y - b.y) * (a.x - b.x) / (a.y - b.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        i_prev = i;
    }
    inside
}

/// Inclusion test for many points against one ring, with a bounding box
/// prefilter.
pub fn points_in_polygon(x: &[f64], y: &[f64], pts: &[Point], radius: f64) -> Vec<bool> {
    let bbox = match BoundingBox::from_points(x, y) {
        Some(b) => b.expand(radius),
        None => return vec![false; pts.len()],
    };
    pts.iter()
        .map(|&p| bbox.contains_point(p.x, p.y) && point_in_polygon(x, y, p, radius))
        .collect()
}

/// Twice the signed area of a ring; positive for counter-clockwise order.
pub fn signed_area2(x: &[f64], y: &[f64]) -> f64 {
    let (x, y) = open_ring(x, y);
    let n = x.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let i1 = (i + 1) % n;
        sum += x[i] * y[i1] - x[i1] * y[i];
    }
    sum
}

pub fn signed_area(x: &[f64], y: &[f64]) -> f64 {
    0.5 * signed_area2(x, y)
}

fn cross(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ax * by - ay * bx
}

/// Intersection of two segments in the plane, no seam handling.
///
/// Returns `None` for parallel segments and when the crossing lies outside
/// either segment.
pub fn planar_segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    const EPS: f64 = 1.0e-12;

    let (rx, ry) = (a2.x - a1.x, a2.y - a1.y);
    let (sx, sy) = (b2.x - b1.x, b2.y - b1.y);
    let denom = cross(rx, ry, sx, sy);
    let scale = (rx.abs() + ry.abs()) * (sx.abs() + sy.abs());
    if denom.abs() <= EPS * scale.max(EPS) {
        return None;
    }

    let (qx, qy) = (b1.x - a1.x, b1.y - a1.y);
    let t = cross(qx, qy, sx, sy) / denom;
    let u = cross(qx, qy, rx, ry) / denom;
    let tol = 1.0e-9;
    if !(-tol..=1.0 + tol).contains(&t) || !(-tol..=1.0 + tol).contains(&u) {
        return None;
    }
    let t = t.clamp(0.0, 1.0);
    Some(Point::new(a1.x + t * rx, a1.y + t * ry))
}

/// Move the second endpoint across the seam when the segment spans more than
/// 90° of longitude.
fn unwrap_segment(p1: Point, mut p2: Point) -> (Point, Point) {
    if p2.x - p1.x > 90.0 {
        p2.x -= 360.0;
    } else if p2.x - p1.x < -90.0 {
        p2.x += 360.0;
    }
    (p1, p2)
}

/// Intersection of segments `a` and `b` with antimeridian unwrap applied to
/// each segment first. Vertical segments are supported.
pub fn segment_intersection(a: [Point; 2], b: [Point; 2]) -> Option<Point> {
    let (a1, a2) = unwrap_segment(a[0], a[1]);
    let (b1, b2) = unwrap_segment(b[0], b[1]);
    planar_segment_intersection(a1, a2, b1, b2)
}

/// True when `p` lies on segment `a`-`b` by the sum-of-distances test with
/// relative tolerance `rel`.
pub fn on_segment(p: Point, a: Point, b: Point, rel: f64) -> bool {
    let len = a.distance(&b);
    let sum = a.distance(&p) + p.distance(&b);
    (sum - len).abs() <= rel * len.max(f64::EPSILON)
}
