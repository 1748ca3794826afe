//! Freehand pen stroke.

use super::{ShapeTrait, centroid, points_bounds};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A polyline captured from pointer motion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Freehand {
    pub points: Vec<Point>,
}

impl Freehand {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl ShapeTrait for Freehand {
    fn bounds(&self) -> Rect {
        points_bounds(&self.points)
    }

    fn center(&self) -> Point {
        centroid(&self.points)
    }

    fn origin(&self) -> Point {
        self.points.first().copied().unwrap_or(Point::ZERO)
    }

    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    /// Vertex proximity only; segments between samples are not tested.
    fn hit_test(&self, point: Point, stroke_width: f64) -> bool {
        let tolerance = stroke_width * 2.0;
        self.points.iter().any(|p| p.distance(point) <= tolerance)
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some(first) = self.points.first() else {
            return path;
        };
        path.move_to(*first);
        if self.points.len() == 1 {
            // Zero-length segment so a round cap still paints a dot.
            path.line_to(*first);
        } else {
            for p in &self.points[1..] {
                path.line_to(*p);
            }
        }
        path
    }
}
