//! Text labels and text measurement.

use super::ShapeTrait;
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Measures rendered text width for a given font size.
///
/// The render crate provides a glyph-based implementation; the core crate
/// falls back to [`ApproximateMetrics`].
pub trait TextMeasure: fmt::Debug + Send + Sync {
    fn text_width(&self, text: &str, font_size: f64) -> f64;
}

/// Fixed-advance estimate used when no font is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateMetrics;

impl ApproximateMetrics {
    /// Average glyph advance as a fraction of the font size.
    pub const CHAR_WIDTH_RATIO: f64 = 0.6;
}

impl TextMeasure for ApproximateMetrics {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * Self::CHAR_WIDTH_RATIO
    }
}

/// A single-line text label anchored at its baseline-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// Baseline-left anchor.
    pub position: Point,
    pub content: String,
    pub font_size: f64,
    /// Width measured at commit time, if a measurer was available.
    #[serde(default)]
    pub measured_width: Option<f64>,
}

impl Text {
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    pub fn new(position: Point, content: String, font_size: f64) -> Self {
        Self {
            position,
            content,
            font_size,
            measured_width: None,
        }
    }

    /// Record the measured width of the current content.
    pub fn measure(&mut self, measure: &dyn TextMeasure) {
        self.measured_width = Some(measure.text_width(&self.content, self.font_size));
    }

    pub fn width(&self) -> f64 {
        self.measured_width
            .unwrap_or_else(|| ApproximateMetrics.text_width(&self.content, self.font_size))
    }
}

impl ShapeTrait for Text {
    /// From one font size above the baseline down to the baseline.
    fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y - self.font_size,
            self.position.x + self.width(),
            self.position.y,
        )
    }

    fn center(&self) -> Point {
        self.bounds().center()
    }

    fn origin(&self) -> Point {
        self.position
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn hit_test(&self, point: Point, _stroke_width: f64) -> bool {
        let b = self.bounds();
        point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
    }

    fn to_path(&self) -> BezPath {
        BezPath::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(f64);

    impl TextMeasure for Fixed {
        fn text_width(&self, _text: &str, _font_size: f64) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_bounds_above_baseline() {
        let text = Text::new(Point::new(10.0, 50.0), "abcd".into(), 20.0);
        let b = text.bounds();
        assert!((b.y0 - 30.0).abs() < f64::EPSILON);
        assert!((b.y1 - 50.0).abs() < f64::EPSILON);
        assert!((b.width() - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_measured_width_wins() {
        let mut text = Text::new(Point::ZERO, "hello".into(), 16.0);
        text.measure(&Fixed(77.0));
        assert!((text.width() - 77.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_box() {
        let text = Text::new(Point::new(0.0, 20.0), "hi".into(), 20.0);
        assert!(text.hit_test(Point::new(5.0, 10.0), 2.0));
        assert!(!text.hit_test(Point::new(5.0, 25.0), 2.0));
    }
}
