//! Circle shape.

use super::ShapeTrait;
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// A circle defined by its center and radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl ShapeTrait for Circle {
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

    fn hit_test(&self, point: Point, _stroke_width: f64) -> bool {
        point.distance(self.center) <= self.radius
    }

    fn to_path(&self) -> BezPath {
        kurbo::Circle::new(self.center, self.radius).to_path(0.1)
    }
}
