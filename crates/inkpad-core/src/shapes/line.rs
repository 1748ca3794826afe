//! Straight line segment.

use super::{ShapeTrait, point_to_segment_dist, points_bounds};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A line between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }
}

impl ShapeTrait for Line {
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

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        path.line_to(self.end);
        path
    }
}
