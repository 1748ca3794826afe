//! Five-pointed star.

use super::ShapeTrait;
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A regular star inscribed in a circle of `radius` around `center`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub center: Point,
    /// Outer (tip) radius.
    pub radius: f64,
}

impl Star {
    /// Number of tips.
    pub const POINTS: usize = 5;
    /// Inner radius as a fraction of the outer radius.
    pub const INNER_RATIO: f64 = 0.5;

    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Polygon vertices alternating outer and inner radius, first tip pointing up.
    pub fn vertices(&self) -> Vec<Point> {
        let inner = self.radius * Self::INNER_RATIO;
        let step = PI / Self::POINTS as f64;
        (0..Self::POINTS * 2)
            .map(|i| {
                let r = if i % 2 == 0 { self.radius } else { inner };
                let angle = -PI / 2.0 + step * i as f64;
                Point::new(
                    self.center.x + r * angle.cos(),
                    self.center.y + r * angle.sin(),
                )
            })
            .collect()
    }
}

impl ShapeTrait for Star {
    fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    fn center(&self) -> Point {
        self.center
    }

    fn origin(&self) -> Point {
        self.center
    }

    fn translate(&mut self, delta: Vec2) {
        self.center += delta;
    }

    // Hit region is the circumscribed circle, not the polygon.
    fn hit_test(&self, point: Point, _stroke_width: f64) -> bool {
        point.distance(self.center) <= self.radius
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut vertices = self.vertices().into_iter();
        if let Some(first) = vertices.next() {
            path.move_to(first);
            for v in vertices {
                path.line_to(v);
            }
            path.close_path();
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices_alternate_radius() {
        let star = Star::new(Point::new(0.0, 0.0), 10.0);
        let vertices = star.vertices();
        assert_eq!(vertices.len(), 10);
        assert!((vertices[0].x).abs() < 1e-9);
        assert!((vertices[0].y + 10.0).abs() < 1e-9);
        for (i, v) in vertices.iter().enumerate() {
            let expected = if i % 2 == 0 { 10.0 } else { 5.0 };
            assert!((v.distance(Point::ZERO) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_hit_test_uses_outer_radius() {
        let star = Star::new(Point::new(50.0, 50.0), 20.0);
        assert!(star.hit_test(Point::new(65.0, 50.0), 2.0));
        assert!(!star.hit_test(Point::new(71.0, 50.0), 2.0));
    }
}
