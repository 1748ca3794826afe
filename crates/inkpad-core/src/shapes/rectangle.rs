//! Rectangle geometry, shared by the sharp and rounded variants.

use super::ShapeTrait;
use kurbo::{BezPath, Point, Rect, RoundedRect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle anchored at the drag start.
///
/// Width and height are signed: dragging up or left produces negative
/// extents, which are normalized for hit-testing and painting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Anchor corner (where the drag began).
    pub position: Point,
    /// Signed width.
    pub width: f64,
    /// Signed height.
    pub height: f64,
}

impl Rectangle {
    /// Upper bound for the corner radius of rounded rectangles.
    pub const MAX_CORNER_RADIUS: f64 = 12.0;

    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            position,
            width,
            height,
        }
    }

    /// Build a rectangle spanning from the anchor to the current pointer.
    pub fn from_corners(anchor: Point, current: Point) -> Self {
        Self::new(anchor, current.x - anchor.x, current.y - anchor.y)
    }

    /// Normalized kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
        .abs()
    }

    /// Corner radius used by the rounded variant.
    pub fn corner_radius(&self) -> f64 {
        Self::MAX_CORNER_RADIUS
            .min(self.width.abs() / 2.0)
            .min(self.height.abs() / 2.0)
    }

    pub fn to_rounded_path(&self) -> BezPath {
        RoundedRect::from_rect(self.as_rect(), self.corner_radius()).to_path(0.1)
    }
}

impl ShapeTrait for Rectangle {
    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn center(&self) -> Point {
        self.as_rect().center()
    }

    fn origin(&self) -> Point {
        self.position
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn hit_test(&self, point: Point, _stroke_width: f64) -> bool {
        let r = self.as_rect();
        point.x >= r.x0 && point.x <= r.x1 && point.y >= r.y0 && point.y <= r.y1
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }
}
