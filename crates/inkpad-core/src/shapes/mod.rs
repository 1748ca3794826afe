//! Draw object definitions for the whiteboard.
//!
//! Every object on the surface is a [`DrawObject`]: the attributes shared by
//! all variants (identity, style, rotation, paint order) plus a [`Shape`]
//! that carries only the geometry relevant to its variant.

mod arrow;
mod circle;
mod freehand;
mod line;
mod rectangle;
mod star;
mod text;
mod triangle;

pub use arrow::Arrow;
pub use circle::Circle;
pub use freehand::Freehand;
pub use line::Line;
pub use rectangle::Rectangle;
pub use star::Star;
pub use text::{ApproximateMetrics, Text, TextMeasure};
pub use triangle::Triangle;

use kurbo::{BezPath, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for draw objects.
pub type ShapeId = Uuid;

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),
    #[error("Unsupported color format: {0}")]
    Unsupported(String),
}

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse(color: &str) -> Result<Self, ColorParseError> {
        let color = color.trim();
        let Some(hex) = color.strip_prefix('#') else {
            return Err(ColorParseError::Unsupported(color.to_string()));
        };
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidHex(color.to_string()));
        }
        let channel = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| ColorParseError::InvalidHex(color.to_string()))
        };
        match hex.len() {
            3 => {
                let r = channel(&hex[0..1])? * 17;
                let g = channel(&hex[1..2])? * 17;
                let b = channel(&hex[2..3])? * 17;
                Ok(Self::new(r, g, b, 255))
            }
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => Err(ColorParseError::InvalidHex(color.to_string())),
        }
    }

    /// Parse a fill or background color, where `none` and `transparent` mean no color.
    pub fn parse_optional(color: &str) -> Result<Option<Self>, ColorParseError> {
        match color.trim() {
            "none" | "transparent" | "" => Ok(None),
            other => Self::parse(other).map(Some),
        }
    }

    /// Format as `#rrggbb` (or `#rrggbbaa` when not fully opaque).
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Perceived brightness in `0.0..=1.0` (Rec. 601 luma).
    pub fn brightness(&self) -> f64 {
        (0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64) / 255.0
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties shared by every draw object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color (also the glyph color for text).
    pub stroke_color: SerializableColor,
    /// Fill color (None = stroke only).
    pub fill_color: Option<SerializableColor>,
    /// Stroke width in logical pixels.
    pub stroke_width: f64,
    /// Opacity in percent, `0..=100`.
    pub opacity: u8,
}

impl ShapeStyle {
    /// Opacity as a `0.0..=1.0` factor.
    pub fn opacity_factor(&self) -> f32 {
        f32::from(self.opacity.min(100)) / 100.0
    }

    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }

    /// Get the fill color as a peniko Color.
    pub fn fill(&self) -> Option<Color> {
        self.fill_color.map(Into::into)
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            fill_color: None,
            stroke_width: 2.0,
            opacity: 100,
        }
    }
}

/// Distance from a point to a line segment (a→b), clamped to the endpoints.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    point.distance(proj)
}

/// Axis-aligned bounds of a set of points.
pub(crate) fn points_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |r, p| {
            Rect::new(r.x0.min(p.x), r.y0.min(p.y), r.x1.max(p.x), r.y1.max(p.y))
        })
}

/// Arithmetic mean of a set of points.
pub(crate) fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ZERO;
    }
    let n = points.len() as f64;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

/// Geometry behaviour implemented by every shape variant.
pub trait ShapeTrait {
    /// Axis-aligned bounding box in unrotated object space.
    fn bounds(&self) -> Rect;

    /// Geometric center used as the rotation pivot.
    fn center(&self) -> Point;

    /// Anchor used for dragging (top-left, center or first point).
    fn origin(&self) -> Point;

    /// Move the shape by `delta`.
    fn translate(&mut self, delta: Vec2);

    /// Check if an (unrotated) point hits this shape.
    fn hit_test(&self, point: Point, stroke_width: f64) -> bool;

    /// Outline for painting. Empty for text, which is painted from glyphs.
    fn to_path(&self) -> BezPath;
}

/// Discriminant of a [`Shape`], used by tools and for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Freehand,
    Rectangle,
    RoundedRectangle,
    Circle,
    Triangle,
    Line,
    Arrow,
    Star,
    Text,
}

/// Closed set of shape variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Freehand(Freehand),
    Rectangle(Rectangle),
    RoundedRectangle(Rectangle),
    Circle(Circle),
    Triangle(Triangle),
    Line(Line),
    Arrow(Arrow),
    Star(Star),
    Text(Text),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Freehand(_) => ShapeKind::Freehand,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::RoundedRectangle(_) => ShapeKind::RoundedRectangle,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Triangle(_) => ShapeKind::Triangle,
            Shape::Line(_) => ShapeKind::Line,
            Shape::Arrow(_) => ShapeKind::Arrow,
            Shape::Star(_) => ShapeKind::Star,
            Shape::Text(_) => ShapeKind::Text,
        }
    }

    fn as_trait(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Freehand(s) => s,
            Shape::Rectangle(s) | Shape::RoundedRectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Triangle(s) => s,
            Shape::Line(s) => s,
            Shape::Arrow(s) => s,
            Shape::Star(s) => s,
            Shape::Text(s) => s,
        }
    }

    fn as_trait_mut(&mut self) -> &mut dyn ShapeTrait {
        match self {
            Shape::Freehand(s) => s,
            Shape::Rectangle(s) | Shape::RoundedRectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Triangle(s) => s,
            Shape::Line(s) => s,
            Shape::Arrow(s) => s,
            Shape::Star(s) => s,
            Shape::Text(s) => s,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.as_trait().bounds()
    }

    pub fn center(&self) -> Point {
        self.as_trait().center()
    }

    pub fn origin(&self) -> Point {
        self.as_trait().origin()
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.as_trait_mut().translate(delta);
    }

    pub fn hit_test(&self, point: Point, stroke_width: f64) -> bool {
        self.as_trait().hit_test(point, stroke_width)
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            Shape::RoundedRectangle(r) => r.to_rounded_path(),
            other => other.as_trait().to_path(),
        }
    }

    /// Whether the variant has an interior that a fill color applies to.
    pub fn is_fillable(&self) -> bool {
        matches!(
            self,
            Shape::Rectangle(_)
                | Shape::RoundedRectangle(_)
                | Shape::Circle(_)
                | Shape::Triangle(_)
                | Shape::Star(_)
        )
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// A single entity on the whiteboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawObject {
    pub(crate) id: ShapeId,
    /// Stroke, fill, width and opacity.
    pub style: ShapeStyle,
    /// Rotation in degrees about [`Shape::center`].
    pub rotation: f64,
    /// Paint order key; higher paints later.
    pub z_index: i64,
    /// Variant geometry.
    pub shape: Shape,
}

impl DrawObject {
    /// Create a new object with a fresh id. The z-index is assigned when the
    /// object is added to a document.
    pub fn new(shape: Shape, style: ShapeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            style,
            rotation: 0.0,
            z_index: 0,
            shape,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// Replace the id with a new unique identifier (used when duplicating).
    pub fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
    }

    /// Fill color to paint, honoring stroke-only variants and `none` fills.
    pub fn effective_fill(&self) -> Option<SerializableColor> {
        if self.shape.is_fillable() {
            self.style.fill_color
        } else {
            None
        }
    }
}
