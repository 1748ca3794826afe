//! Arrow shape.

use super::{ShapeTrait, point_to_segment_dist, points_bounds};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A line with a filled triangular head at `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub start: Point,
    pub end: Point,
}

impl Arrow {
    /// Minimum head length in pixels.
    pub const MIN_HEAD_LENGTH: f64 = 15.0;
    /// Half-angle of the head.
    pub const HEAD_ANGLE: f64 = PI / 6.0;

    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn head_length(stroke_width: f64) -> f64 {
        Self::MIN_HEAD_LENGTH.max(stroke_width * 3.0)
    }

    /// Head triangle: tip, then the two barbs at ±30° from the shaft direction.
    pub fn head(&self, stroke_width: f64) -> [Point; 3] {
        let angle = (self.end.y - self.start.y).atan2(self.end.x - self.start.x);
        let len = Self::head_length(stroke_width);
        let barb = |a: f64| Point::new(self.end.x - len * a.cos(), self.end.y - len * a.sin());
        [
            self.end,
            barb(angle - Self::HEAD_ANGLE),
            barb(angle + Self::HEAD_ANGLE),
        ]
    }

    pub fn head_path(&self, stroke_width: f64) -> BezPath {
        let [tip, left, right] = self.head(stroke_width);
        let mut path = BezPath::new();
        path.move_to(tip);
        path.line_to(left);
        path.line_to(right);
        path.close_path();
        path
    }
}

impl ShapeTrait for Arrow {
    fn bounds(&self) -> Rect {
        points_bounds(&[self.start, self.end])
    }

    fn center(&self) -> Point {
        self.start.midpoint(self.end)
    }

    fn origin(&self) -> Point {
        self.start
    }

    fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
    }

    fn hit_test(&self, point: Point, stroke_width: f64) -> bool {
        point_to_segment_dist(point, self.start, self.end) <= stroke_width * 2.0
    }

    /// Shaft only; see [`Arrow::head_path`].
    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        path.line_to(self.end);
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_points_back_along_shaft() {
        let arrow = Arrow::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let [tip, left, right] = arrow.head(2.0);
        assert_eq!(tip, Point::new(100.0, 0.0));
        assert!(left.x < 100.0 && right.x < 100.0);
        assert!((left.y + right.y).abs() < 1e-9);
        assert!((tip.distance(left) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_head_grows_with_stroke() {
        assert!((Arrow::head_length(2.0) - 15.0).abs() < f64::EPSILON);
        assert!((Arrow::head_length(10.0) - 30.0).abs() < f64::EPSILON);
    }
}
