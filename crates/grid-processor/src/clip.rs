//! Shoreline clipping against the domain rectangle.
//!
//! Every polygon of the requested level (plus lake margins) is classified as
//! outside, inside, covering the whole domain, or crossing its boundary. Crossing
//! polygons are cut at their boundary crossings and each inside run is spliced
//! back into a closed ring by walking the domain perimeter counter-clockwise
//! to the next entry crossing, picking up the domain corners that lie inside
//! the polygon on the way.
//!
//! Perimeter positions are measured as `k + t`, where `k` is the domain edge
//! (0 south, 1 east, 2 north, 3 west, each starting at its ccw corner
//! SW, SE, NE, NW) and `t ∈ [0, 1)` the fraction along it.

use gridgen_common::{BoundarySet, BoundingBox, GridGenError, GridGenResult, Polygon, PolygonLevel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::geometry::{
    on_segment, planar_segment_intersection, point_in_polygon, signed_area2, Point, PIP_RADIUS,
};

/// Distance within which a vertex counts as lying on a domain edge.
pub const ON_EDGE_EPS: f64 = 1.0e-5;

/// Relative slack of the sum-of-distances test for crossing points.
const CROSSING_REL_TOL: f64 = 1.0e-3;

/// Reassembled pieces with less area than this are dropped.
const MIN_PIECE_AREA: f64 = 1.0e-12;

/// Longitude shifts tried for each polygon.
const FRAME_SHIFTS: [f64; 3] = [0.0, -360.0, 360.0];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipParams {
    /// Largest ccw perimeter distance searched for the next entry crossing
    /// before falling back to the nearest one in either direction.
    pub min_val: f64,
    /// Level to keep (lake margins, level 2, are always kept).
    pub bflg: u8,
}

impl Default for ClipParams {
    fn default() -> Self {
        Self {
            min_val: 4.0,
            bflg: PolygonLevel::LAND,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VertexTag {
    In,
    On,
    Out,
}

/// The domain rectangle with its ccw corners and edge lengths.
#[derive(Debug, Clone)]
pub(crate) struct DomainBox {
    bbox: BoundingBox,
    corners: [Point; 4],
    lengths: [f64; 4],
}

impl DomainBox {
    pub(crate) fn new(bbox: &BoundingBox) -> GridGenResult<Self> {
        if !(bbox.width() > 0.0 && bbox.height() > 0.0) {
            return Err(GridGenError::coordinate(format!(
                "clip domain has no area: {:?}",
                bbox
            )));
        }
        let corners = [
            Point::new(bbox.min_x, bbox.min_y),
            Point::new(bbox.max_x, bbox.min_y),
            Point::new(bbox.max_x, bbox.max_y),
            Point::new(bbox.min_x, bbox.max_y),
        ];
        let lengths = [bbox.width(), bbox.height(), bbox.width(), bbox.height()];
        Ok(Self {
            bbox: *bbox,
            corners,
            lengths,
        })
    }

    fn edge(&self, k: usize) -> (Point, Point) {
        (self.corners[k], self.corners[(k + 1) % 4])
    }

    fn tag(&self, p: Point) -> VertexTag {
        let b = &self.bbox;
        let e = ON_EDGE_EPS;
        if p.x > b.min_x + e && p.x < b.max_x - e && p.y > b.min_y + e && p.y < b.max_y - e {
            VertexTag::In
        } else if p.x >= b.min_x - e && p.x <= b.max_x + e && p.y >= b.min_y - e && p.y <= b.max_y + e
        {
            VertexTag::On
        } else {
            VertexTag::Out
        }
    }

    /// Perimeter position of a point on (or within tolerance of) the boundary.
    fn perimeter_distance(&self, p: Point) -> f64 {
        let b = &self.bbox;
        let gaps = [
            (p.y - b.min_y).abs(),
            (p.x - b.max_x).abs(),
            (p.y - b.max_y).abs(),
            (p.x - b.min_x).abs(),
        ];
        let mut k = 0;
        for i in 1..4 {
            if gaps[i] < gaps[k] {
                k = i;
            }
        }
        let frac = (self.corners[k].distance(&p) / self.lengths[k]).clamp(0.0, 1.0);
        if frac >= 1.0 - 1.0e-12 {
            ((k + 1) % 4) as f64
        } else {
            k as f64 + frac
        }
    }

    /// Boundary crossing of a segment with one endpoint inside.
    fn crossing(&self, a: Point, b: Point) -> Option<Point> {
        (0..4).find_map(|k| {
            let (e0, e1) = self.edge(k);
            planar_segment_intersection(a, b, e0, e1).filter(|&p| {
                on_segment(p, a, b, CROSSING_REL_TOL) && on_segment(p, e0, e1, CROSSING_REL_TOL)
            })
        })
    }
}

/// Liang-Barsky parameters `(t_enter, t_exit)` of segment `a`-`b` inside
/// `bbox`, if any part of it is inside.
fn clip_parameters(a: Point, b: Point, bbox: &BoundingBox) -> Option<(f64, f64)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let checks = [
        (-dx, a.x - bbox.min_x),
        (dx, bbox.max_x - a.x),
        (-dy, a.y - bbox.min_y),
        (dy, bbox.max_y - a.y),
    ];
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

fn lerp(a: Point, b: Point, t: f64) -> Point {
    Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y))
}

/// Make a ring continuous across the antimeridian. Rings that do not close
/// once unwrapped (they circle a pole) are returned unchanged.
pub(crate) fn unwrap_ring(polygon: &Polygon) -> Polygon {
    let (x, y) = polygon.open_ring();
    let n = x.len();
    if n < 2 {
        return polygon.clone();
    }

    let mut ux = Vec::with_capacity(n + 1);
    ux.push(x[0]);
    let mut changed = false;
    for i in 1..n {
        let prev = ux[i - 1];
        let mut v = x[i];
        while v - prev > 180.0 {
            v -= 360.0;
        }
        while v - prev < -180.0 {
            v += 360.0;
        }
        changed |= v != x[i];
        ux.push(v);
    }

    if !changed || (ux[0] - ux[n - 1]).abs() > 180.0 {
        return polygon.clone();
    }

    let mut uy = y.to_vec();
    if polygon.is_closed() {
        ux.push(ux[0]);
        uy.push(uy[0]);
    }
    Polygon::new(ux, uy, polygon.level)
}

/// Result of clipping one polygon.
#[derive(Debug, Clone)]
pub(crate) enum ClipOutcome {
    Outside,
    Inside(Polygon),
    /// The polygon covers the whole domain
    Covers(Polygon),
    Pieces(Vec<Polygon>),
    /// Crossings could not be paired
    Skipped(String),
}

/// One inside run of the polygon: entry crossing, interior vertices, exit
/// crossing.
struct CrossingPair {
    entry: Point,
    exit: Point,
    interior: Vec<Point>,
    entry_dist: f64,
    exit_dist: f64,
}

fn ccw_distance(from: f64, to: f64) -> f64 {
    (to - from).rem_euclid(4.0)
}

fn close_piece(mut ring: Vec<Point>, level: u8) -> Option<Polygon> {
    ring.dedup_by(|a, b| a.distance(b) < 1.0e-12);
    if ring.len() > 1 && ring[0].distance(&ring[ring.len() - 1]) < 1.0e-12 {
        ring.pop();
    }
    if ring.len() < 3 {
        return None;
    }
    let x: Vec<f64> = ring.iter().map(|p| p.x).chain(std::iter::once(ring[0].x)).collect();
    let y: Vec<f64> = ring.iter().map(|p| p.y).chain(std::iter::once(ring[0].y)).collect();
    if signed_area2(&x, &y).abs() * 0.5 < MIN_PIECE_AREA {
        return None;
    }
    Some(Polygon::new(x, y, level))
}

pub(crate) fn clip_polygon(
    dom: &DomainBox,
    polygon: &Polygon,
    min_val: f64,
) -> GridGenResult<ClipOutcome> {
    let pbox = polygon.bbox();
    if !pbox.intersects(&dom.bbox) {
        return Ok(ClipOutcome::Outside);
    }
    if dom.bbox.contains_bbox(&pbox) {
        return Ok(ClipOutcome::Inside(polygon.closed()));
    }

    let (ox, oy) = polygon.open_ring();
    let mut pts: Vec<Point> = ox.iter().zip(oy).map(|(&x, &y)| Point::new(x, y)).collect();
    if pts.len() < 3 {
        return Ok(ClipOutcome::Outside);
    }
    if signed_area2(ox, oy) < 0.0 {
        debug!(vertices = pts.len(), "Reversing clockwise ring");
        pts.reverse();
    }
    let ring_x: Vec<f64> = pts.iter().map(|p| p.x).collect();
    let ring_y: Vec<f64> = pts.iter().map(|p| p.y).collect();

    // Tag vertices, inserting the crossings of edges that pass through the
    // domain without a vertex inside.
    let n = pts.len();
    let mut verts: Vec<(Point, VertexTag)> = Vec::with_capacity(n + 8);
    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        let ta = dom.tag(a);
        verts.push((a, ta));
        if ta == VertexTag::Out && dom.tag(b) == VertexTag::Out {
            if let Some((t0, t1)) = clip_parameters(a, b, &dom.bbox) {
                if t1 - t0 > 1.0e-12 {
                    verts.push((lerp(a, b, t0), VertexTag::On));
                    verts.push((lerp(a, b, t1), VertexTag::On));
                }
            }
        }
    }

    // A lone boundary vertex between two outside vertices only grazes a
    // corner or edge.
    let m = verts.len();
    let grazes: Vec<usize> = (0..m)
        .filter(|&i| {
            verts[i].1 == VertexTag::On
                && verts[(i + m - 1) % m].1 == VertexTag::Out
                && verts[(i + 1) % m].1 == VertexTag::Out
        })
        .collect();
    for i in grazes {
        verts[i].1 = VertexTag::Out;
    }

    let inside: Vec<bool> = verts.iter().map(|v| v.1 != VertexTag::Out).collect();
    if inside.iter().all(|&v| v) {
        return Ok(ClipOutcome::Inside(polygon.closed()));
    }
    if !inside.iter().any(|&v| v) {
        let covers = dom
            .corners
            .iter()
            .all(|&c| point_in_polygon(&ring_x, &ring_y, c, PIP_RADIUS));
        return Ok(if covers {
            ClipOutcome::Covers(Polygon::rectangle(&dom.bbox, polygon.level))
        } else {
            ClipOutcome::Outside
        });
    }

    let mut out2in = Vec::new();
    let mut in2out = Vec::new();
    for i in 0..m {
        let a = inside[i];
        let b = inside[(i + 1) % m];
        if !a && b {
            out2in.push(i);
        } else if a && !b {
            in2out.push(i);
        }
    }
    if out2in.len() != in2out.len() || out2in.is_empty() {
        return Ok(ClipOutcome::Skipped(format!(
            "{} entries vs {} exits",
            out2in.len(),
            in2out.len()
        )));
    }
    let first_exit = in2out.iter().position(|&e| e > out2in[0]).unwrap_or(0);
    in2out.rotate_left(first_exit);

    let no_crossing = |a: Point, b: Point| {
        GridGenError::geometry(format!(
            "no domain crossing between ({:.6}, {:.6}) and ({:.6}, {:.6}); \
             increase split_lim so the polygon is clipped in smaller tiles",
            a.x, a.y, b.x, b.y
        ))
    };

    let mut pairs = Vec::with_capacity(out2in.len());
    for (&o, &e) in out2in.iter().zip(&in2out) {
        let first_in = (o + 1) % m;
        let after_exit = (e + 1) % m;

        let entry = if verts[first_in].1 == VertexTag::On {
            verts[first_in].0
        } else {
            dom.crossing(verts[o].0, verts[first_in].0)
                .ok_or_else(|| no_crossing(verts[o].0, verts[first_in].0))?
        };
        let exit = if verts[e].1 == VertexTag::On {
            verts[e].0
        } else {
            dom.crossing(verts[e].0, verts[after_exit].0)
                .ok_or_else(|| no_crossing(verts[e].0, verts[after_exit].0))?
        };

        let mut interior = Vec::new();
        let mut i = first_in;
        loop {
            interior.push(verts[i].0);
            if i == e {
                break;
            }
            i = (i + 1) % m;
        }

        pairs.push(CrossingPair {
            entry,
            exit,
            interior,
            entry_dist: dom.perimeter_distance(entry),
            exit_dist: dom.perimeter_distance(exit),
        });
    }

    // Corners outside the polygon are never walked.
    let mut corner_used: [bool; 4] = [false; 4];
    for (c, used) in corner_used.iter_mut().enumerate() {
        *used = !point_in_polygon(&ring_x, &ring_y, dom.corners[c], PIP_RADIUS);
    }

    let mut pair_used = vec![false; pairs.len()];
    let mut pieces = Vec::new();

    loop {
        let Some(start) = (0..pairs.len())
            .filter(|&i| !pair_used[i])
            .min_by(|&a, &b| pairs[a].entry_dist.total_cmp(&pairs[b].entry_dist))
        else {
            break;
        };
        let mut ring: Vec<Point> = Vec::new();
        let mut cur = start;

        for _ in 0..=pairs.len() {
            pair_used[cur] = true;
            let pair = &pairs[cur];
            ring.push(pair.entry);
            ring.extend_from_slice(&pair.interior);
            ring.push(pair.exit);

            let candidates = (0..pairs.len()).filter(|&i| !pair_used[i] || i == start);
            let deltas: Vec<(usize, f64)> = candidates
                .map(|i| (i, ccw_distance(pair.exit_dist, pairs[i].entry_dist)))
                .collect();
            let next = deltas
                .iter()
                .filter(|(_, d)| *d <= min_val)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .or_else(|| {
                    deltas
                        .iter()
                        .min_by(|a, b| a.1.min(4.0 - a.1).total_cmp(&b.1.min(4.0 - b.1)))
                })
                .copied();
            let Some((next, delta)) = next else {
                break;
            };

            // Corners passed on the ccw walk from this exit to the next entry.
            let mut passed: Vec<(f64, usize)> = (0..4)
                .map(|c| (ccw_distance(pair.exit_dist, c as f64), c))
                .filter(|&(d, c)| d <= delta && !corner_used[c])
                .collect();
            passed.sort_by(|a, b| a.0.total_cmp(&b.0));
            for (d, c) in passed {
                if d > 1.0e-12 && d < delta - 1.0e-12 {
                    ring.push(dom.corners[c]);
                }
                corner_used[c] = true;
            }

            if next == start {
                break;
            }
            cur = next;
        }

        match close_piece(ring, polygon.level) {
            Some(piece) => pieces.push(piece),
            None => debug!("Dropped degenerate clipped piece"),
        }
    }

    Ok(ClipOutcome::Pieces(pieces))
}

/// Clip `boundaries` to `domain`.
///
/// Keeps polygons whose level is `params.bflg` or a lake margin. Each polygon
/// is unwrapped to a continuous ring and tried at longitude shifts of 0 and
/// ±360 so a domain expressed beyond ±180 receives it in its own frame.
pub fn compute_boundary(
    domain: &BoundingBox,
    boundaries: &BoundarySet,
    params: &ClipParams,
) -> GridGenResult<BoundarySet> {
    let dom = DomainBox::new(domain)?;
    let mut out = BoundarySet::new();
    let (mut inside, mut covering, mut split, mut skipped) = (0usize, 0usize, 0usize, 0usize);

    for (idx, polygon) in boundaries.iter().enumerate() {
        if polygon.level != params.bflg && polygon.level != PolygonLevel::LAKE {
            continue;
        }
        if polygon.n() < 3 {
            continue;
        }
        let ring = unwrap_ring(polygon);

        for shift in FRAME_SHIFTS {
            let candidate = if shift == 0.0 { ring.clone() } else { ring.shifted_x(shift) };
            if !candidate.bbox().intersects(&dom.bbox) {
                continue;
            }
            match clip_polygon(&dom, &candidate, params.min_val)? {
                ClipOutcome::Outside => {}
                ClipOutcome::Inside(p) => {
                    inside += 1;
                    out.push(p);
                }
                ClipOutcome::Covers(p) => {
                    debug!(
                        polygon = idx,
                        level = PolygonLevel::describe(polygon.level),
                        "Polygon covers the domain"
                    );
                    covering += 1;
                    out.push(p);
                }
                ClipOutcome::Pieces(pieces) => {
                    debug!(polygon = idx, pieces = pieces.len(), shift, "Polygon clipped");
                    split += 1;
                    out.polygons.extend(pieces);
                }
                ClipOutcome::Skipped(reason) => {
                    warn!(polygon = idx, shift, reason = %reason, "Skipping polygon with unpaired crossings");
                    skipped += 1;
                }
            }
        }
    }

    info!(
        input = boundaries.len(),
        output = out.len(),
        inside,
        covering,
        clipped = split,
        skipped,
        "Boundary clipped to domain"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64, level: u8) -> Polygon {
        Polygon::rectangle(&BoundingBox::new(x0, y0, x1, y1), level)
    }

    fn area(p: &Polygon) -> f64 {
        crate::geometry::signed_area(&p.x, &p.y)
    }

    #[test]
    fn test_perimeter_distance() {
        let dom = DomainBox::new(&BoundingBox::new(0.0, 0.0, 2.0, 1.0)).unwrap();
        assert_eq!(dom.perimeter_distance(Point::new(0.0, 0.0)), 0.0);
        assert_eq!(dom.perimeter_distance(Point::new(1.0, 0.0)), 0.5);
        assert_eq!(dom.perimeter_distance(Point::new(2.0, 0.0)), 1.0);
        assert_eq!(dom.perimeter_distance(Point::new(2.0, 0.5)), 1.5);
        assert_eq!(dom.perimeter_distance(Point::new(0.5, 1.0)), 2.75);
        assert_eq!(dom.perimeter_distance(Point::new(0.0, 0.25)), 3.75);
    }

    #[test]
    fn test_clip_parameters() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let (t0, t1) = clip_parameters(Point::new(-1.0, 0.5), Point::new(2.0, 0.5), &bbox).unwrap();
        assert!((t0 - 1.0 / 3.0).abs() < 1e-12);
        assert!((t1 - 2.0 / 3.0).abs() < 1e-12);
        assert!(clip_parameters(Point::new(-1.0, 2.0), Point::new(2.0, 2.0), &bbox).is_none());
    }

    #[test]
    fn test_unwrap_ring() {
        let p = Polygon::new(vec![179.0, -179.0, -179.0, 179.0], vec![0.0, 0.0, 1.0, 1.0], 1);
        let u = unwrap_ring(&p);
        assert_eq!(u.x, vec![179.0, 181.0, 181.0, 179.0]);
        assert_eq!(u.west, 179.0);
        assert_eq!(u.east, 181.0);
    }

    #[test]
    fn test_outside_and_inside() {
        let domain = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let set = BoundarySet::from(vec![
            square(20.0, 20.0, 21.0, 21.0, 1),
            square(2.0, 2.0, 3.0, 3.0, 1),
        ]);
        let out = compute_boundary(&domain, &set, &ClipParams::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.polygons[0].west, 2.0);
    }

    #[test]
    fn test_level_filter() {
        let domain = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let set = BoundarySet::from(vec![
            square(1.0, 1.0, 2.0, 2.0, 2),
            square(3.0, 3.0, 4.0, 4.0, 3),
        ]);
        let out = compute_boundary(&domain, &set, &ClipParams::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.polygons[0].level, 2);
    }

    #[test]
    fn test_domain_inside_polygon() {
        let domain = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let set = BoundarySet::from(vec![square(-5.0, -5.0, 5.0, 5.0, 1)]);
        let out = compute_boundary(&domain, &set, &ClipParams::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.polygons[0].bbox(), domain);
        assert!((area(&out.polygons[0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_half_overlap() {
        // land covering the western half of the domain
        let domain = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        let set = BoundarySet::from(vec![square(-1.0, -1.0, 1.0, 3.0, 1)]);
        let out = compute_boundary(&domain, &set, &ClipParams::default()).unwrap();
        assert_eq!(out.len(), 1);
        let piece = &out.polygons[0];
        assert!(piece.is_closed());
        assert_eq!(piece.bbox(), BoundingBox::new(0.0, 0.0, 1.0, 2.0));
        assert!((area(piece) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_clockwise_input_is_normalized() {
        let domain = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        let p = Polygon::new(
            vec![-1.0, -1.0, 1.0, 1.0, -1.0],
            vec![-1.0, 3.0, 3.0, -1.0, -1.0],
            1,
        );
        let out = compute_boundary(&domain, &BoundarySet::from(vec![p]), &ClipParams::default())
            .unwrap();
        assert_eq!(out.len(), 1);
        assert!((area(&out.polygons[0]) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_peninsula_yields_two_pieces() {
        // a U-shaped landmass whose two arms reach into the domain from the south
        let domain = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let p = Polygon::new(
            vec![1.0, 3.0, 3.0, 7.0, 7.0, 9.0, 9.0, 1.0],
            vec![5.0, 5.0, -2.0, -2.0, 5.0, 5.0, -5.0, -5.0],
            1,
        );
        let out = compute_boundary(&domain, &BoundarySet::from(vec![p]), &ClipParams::default())
            .unwrap();
        assert_eq!(out.len(), 2);
        let mut areas: Vec<f64> = out.iter().map(area).collect();
        areas.sort_by(|a, b| a.total_cmp(b));
        assert!((areas[0] - 10.0).abs() < 1e-9);
        assert!((areas[1] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_edge_slicing_through_domain() {
        // triangle x + y <= 1.5 whose vertices are all outside the domain;
        // its hypotenuse cuts off the north-east corner
        let domain = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let p = Polygon::new(vec![-5.0, 6.5, -5.0], vec![-5.0, -5.0, 6.5], 1);
        let out = compute_boundary(&domain, &BoundarySet::from(vec![p]), &ClipParams::default())
            .unwrap();
        assert_eq!(out.len(), 1);
        assert!((area(&out.polygons[0]) - 0.875).abs() < 1e-9);
    }

    #[test]
    fn test_antimeridian_polygon() {
        // stored in -180..180, domain expressed as 178..182
        let domain = BoundingBox::new(178.0, -1.0, 182.0, 1.0);
        let p = Polygon::new(
            vec![179.5, -179.5, -179.5, 179.5],
            vec![-0.5, -0.5, 0.5, 0.5],
            1,
        );
        let out = compute_boundary(&domain, &BoundarySet::from(vec![p]), &ClipParams::default())
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.polygons[0].west, 179.5);
        assert_eq!(out.polygons[0].east, 180.5);
    }

    #[test]
    fn test_degenerate_domain() {
        let set = BoundarySet::new();
        let err = compute_boundary(&BoundingBox::new(0.0, 0.0, 0.0, 1.0), &set, &ClipParams::default())
            .unwrap_err();
        assert_eq!(err.kind(), "coordinate");
    }
}
