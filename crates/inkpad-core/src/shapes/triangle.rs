//! Isosceles triangle shape.

use super::{ShapeTrait, centroid, points_bounds};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A triangle stored as its three vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub points: [Point; 3],
}

/// Tolerance for the area-sum containment test.
const AREA_EPSILON: f64 = 0.1;

impl Triangle {
    pub fn new(points: [Point; 3]) -> Self {
        Self { points }
    }

    /// Triangle with apex at `anchor`, one base corner at the pointer and the
    /// other base corner mirrored across the vertical through the anchor.
    pub fn from_drag(anchor: Point, pointer: Point) -> Self {
        Self::new([
            anchor,
            pointer,
            Point::new(2.0 * anchor.x - pointer.x, pointer.y),
        ])
    }

    fn area(a: Point, b: Point, c: Point) -> f64 {
        ((a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y)) / 2.0).abs()
    }
}

impl ShapeTrait for Triangle {
    fn bounds(&self) -> Rect {
        points_bounds(&self.points)
    }

    fn center(&self) -> Point {
        centroid(&self.points)
    }

    fn origin(&self) -> Point {
        self.points[0]
    }

    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    fn hit_test(&self, point: Point, _stroke_width: f64) -> bool {
        let [a, b, c] = self.points;
        let whole = Self::area(a, b, c);
        let parts = Self::area(point, b, c) + Self::area(a, point, c) + Self::area(a, b, point);
        (parts - whole).abs() < AREA_EPSILON
    }

    fn to_path(&self) -> BezPath {
        let [a, b, c] = self.points;
        let mut path = BezPath::new();
        path.move_to(a);
        path.line_to(b);
        path.line_to(c);
        path.close_path();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_drag_is_isosceles() {
        let tri = Triangle::from_drag(Point::new(50.0, 0.0), Point::new(80.0, 40.0));
        assert_eq!(tri.points[2], Point::new(20.0, 40.0));
        let left = tri.points[0].distance(tri.points[1]);
        let right = tri.points[0].distance(tri.points[2]);
        assert!((left - right).abs() < 1e-9);
    }

    #[test]
    fn test_hit_test_area_sum() {
        let tri = Triangle::new([
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ]);
        assert!(tri.hit_test(Point::new(2.0, 2.0), 2.0));
        assert!(!tri.hit_test(Point::new(8.0, 8.0), 2.0));
    }

    #[test]
    fn test_center_is_centroid() {
        let tri = Triangle::new([
            Point::new(0.0, 0.0),
            Point::new(6.0, 0.0),
            Point::new(0.0, 9.0),
        ]);
        let c = tri.center();
        assert!((c.x - 2.0).abs() < 1e-9);
        assert!((c.y - 3.0).abs() < 1e-9);
    }
}
