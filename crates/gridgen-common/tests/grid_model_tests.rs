//! Tests for the shared grid, bbox and polygon model.

use gridgen_common::{BoundarySet, BoundingBox, GridField, Polygon, PolygonLevel, TargetGrid};

// ============================================================================
// BoundingBox tests
// ============================================================================

#[test]
fn test_bbox_contains_bbox() {
    let outer = BoundingBox::new(-10.0, -10.0, 10.0, 10.0);
    assert!(outer.contains_bbox(&BoundingBox::new(-1.0, -1.0, 1.0, 1.0)));
    assert!(outer.contains_bbox(&outer));
    assert!(!outer.contains_bbox(&BoundingBox::new(5.0, 5.0, 11.0, 6.0)));
}

#[test]
fn test_bbox_expand_and_shift() {
    let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0).expand(0.5);
    assert_eq!(bbox, BoundingBox::new(-0.5, -0.5, 1.5, 1.5));
    let shifted = bbox.shift_x(360.0);
    assert_eq!(shifted.min_x, 359.5);
    assert_eq!(shifted.min_y, -0.5);
}

// ============================================================================
// TargetGrid tests
// ============================================================================

#[test]
fn test_target_grid_axes() {
    let grid = TargetGrid::new([178.0, 182.0], [0.0, 1.0], 0.5, 0.5, false).unwrap();
    let lon = grid.lon_axis();
    assert_eq!(lon.len(), 9);
    assert_eq!(lon[0], 178.0);
    assert_eq!(lon[8], 182.0);
    let coords = grid.coords();
    assert_eq!(coords.nx(), 9);
    assert_eq!(coords.ny(), 3);
    assert_eq!(coords.lat[(2, 4)], 1.0);
}

#[test]
fn test_target_grid_rejects_latitude_beyond_pole() {
    assert!(TargetGrid::new([0.0, 10.0], [80.0, 95.0], 1.0, 1.0, false).is_err());
}

// ============================================================================
// Polygon / BoundarySet tests
// ============================================================================

#[test]
fn test_rectangle_is_closed_ccw() {
    let rect = Polygon::rectangle(&BoundingBox::new(0.0, 0.0, 2.0, 1.0), PolygonLevel::LAND);
    assert!(rect.is_closed());
    assert_eq!(rect.n(), 5);
    // shoelace sum positive for counter-clockwise rings
    let (x, y) = rect.open_ring();
    let mut area2 = 0.0;
    for i in 0..x.len() {
        let j = (i + 1) % x.len();
        area2 += x[i] * y[j] - x[j] * y[i];
    }
    assert!(area2 > 0.0);
}

#[test]
fn test_boundary_set_extend() {
    let mut a = BoundarySet::new();
    a.push(Polygon::rectangle(&BoundingBox::new(0.0, 0.0, 1.0, 1.0), 1));
    let b = BoundarySet::from(vec![Polygon::rectangle(&BoundingBox::new(2.0, 2.0, 3.0, 3.0), 2)]);
    a.extend(b);
    assert_eq!(a.len(), 2);
    assert_eq!(a.vertex_count(), 10);
    let levels: Vec<u8> = a.iter().map(|p| p.level).collect();
    assert_eq!(levels, vec![1, 2]);
}

#[test]
fn test_field_map() {
    let depth = GridField::from_vec(2, 1, vec![-10.0, 999999.0]).unwrap();
    let mask = depth.map(|&d| if d == 999999.0 { 0u8 } else { 1u8 });
    assert_eq!(mask.data, vec![1, 0]);
    assert!(mask.same_shape(&depth));
}
