//! Shoreline polygons and polygon sets.
//!
//! Polygons are stored flat: two coordinate vectors plus an explicit bounding
//! box and level. Source datasets that leave the ring implicitly closed are
//! accepted; [`Polygon::closed`] adds the closing vertex when needed.

use serde::{Deserialize, Serialize};

use crate::BoundingBox;

/// Shoreline hierarchy levels.
pub struct PolygonLevel;

impl PolygonLevel {
    /// Ocean/land boundary
    pub const LAND: u8 = 1;
    /// Land/lake boundary
    pub const LAKE: u8 = 2;
    /// Island inside a lake
    pub const ISLAND_IN_LAKE: u8 = 3;
    /// Pond on an island inside a lake
    pub const POND_IN_ISLAND: u8 = 4;

    pub fn describe(level: u8) -> &'static str {
        match level {
            Self::LAND => "land",
            Self::LAKE => "lake",
            Self::ISLAND_IN_LAKE => "island_in_lake",
            Self::POND_IN_ISLAND => "pond_in_island",
            _ => "unknown",
        }
    }
}

/// A closed ring of vertices with its bounding box and level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
    pub level: u8,
}

impl Polygon {
    /// Build a polygon and compute its bounding box.
    pub fn new(x: Vec<f64>, y: Vec<f64>, level: u8) -> Self {
        let bbox = BoundingBox::from_points(&x, &y).unwrap_or(BoundingBox::new(0.0, 0.0, 0.0, 0.0));
        Self {
            x,
            y,
            west: bbox.min_x,
            east: bbox.max_x,
            south: bbox.min_y,
            north: bbox.max_y,
            level,
        }
    }

    /// Closed counter-clockwise rectangle covering `bbox`.
    pub fn rectangle(bbox: &BoundingBox, level: u8) -> Self {
        Self::new(
            vec![bbox.min_x, bbox.max_x, bbox.max_x, bbox.min_x, bbox.min_x],
            vec![bbox.min_y, bbox.min_y, bbox.max_y, bbox.max_y, bbox.min_y],
            level,
        )
    }

    /// Vertex count (including the closing vertex if stored).
    pub fn n(&self) -> usize {
        self.x.len()
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.west, self.south, self.east, self.north)
    }

    /// First vertex repeated at the end.
    pub fn is_closed(&self) -> bool {
        self.n() > 1 && self.x[0] == self.x[self.n() - 1] && self.y[0] == self.y[self.n() - 1]
    }

    /// Copy with the closing vertex present.
    pub fn closed(&self) -> Polygon {
        if self.is_closed() || self.n() == 0 {
            return self.clone();
        }
        let mut out = self.clone();
        out.x.push(self.x[0]);
        out.y.push(self.y[0]);
        out
    }

    /// Vertices without the closing duplicate.
    pub fn open_ring(&self) -> (&[f64], &[f64]) {
        if self.is_closed() {
            let m = self.n() - 1;
            (&self.x[..m], &self.y[..m])
        } else {
            (&self.x, &self.y)
        }
    }

    /// Copy translated along longitude.
    pub fn shifted_x(&self, dx: f64) -> Polygon {
        Polygon {
            x: self.x.iter().map(|x| x + dx).collect(),
            west: self.west + dx,
            east: self.east + dx,
            ..self.clone()
        }
    }
}

/// Ordered sequence of polygons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundarySet {
    pub polygons: Vec<Polygon>,
}

impl BoundarySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn push(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    pub fn extend(&mut self, other: BoundarySet) {
        self.polygons.extend(other.polygons);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Polygon> {
        self.polygons.iter()
    }

    /// Total number of stored vertices.
    pub fn vertex_count(&self) -> usize {
        self.polygons.iter().map(Polygon::n).sum()
    }

    /// Concatenate every polygon's vertices into flat arrays.
    pub fn flatten(&self) -> FlatBoundary {
        let total = self.vertex_count();
        let mut flat = FlatBoundary {
            x: Vec::with_capacity(total),
            y: Vec::with_capacity(total),
            poly: Vec::with_capacity(total),
            bboxes: Vec::with_capacity(self.len()),
        };
        for (idx, polygon) in self.polygons.iter().enumerate() {
            flat.x.extend_from_slice(&polygon.x);
            flat.y.extend_from_slice(&polygon.y);
            flat.poly.extend(std::iter::repeat(idx).take(polygon.n()));
            flat.bboxes.push(polygon.bbox());
        }
        flat
    }
}

impl From<Vec<Polygon>> for BoundarySet {
    fn from(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }
}

impl IntoIterator for BoundarySet {
    type Item = Polygon;
    type IntoIter = std::vec::IntoIter<Polygon>;

    fn into_iter(self) -> Self::IntoIter {
        self.polygons.into_iter()
    }
}

/// Every vertex of a boundary set in parallel arrays, shared read-only by
/// obstruction workers.
#[derive(Debug, Clone, Default)]
pub struct FlatBoundary {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Source polygon index of each vertex
    pub poly: Vec<usize>,
    /// Bounding box of each polygon
    pub bboxes: Vec<BoundingBox>,
}

impl FlatBoundary {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}
