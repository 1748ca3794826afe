//! Tool system for the whiteboard.

use crate::shapes::{
    Arrow, Circle, DrawObject, Freehand, Line, Rectangle, SerializableColor, Shape, ShapeStyle,
    Star, Text, Triangle,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Rectangles need at least one side longer than this to be kept.
pub const MIN_RECT_EXTENT: f64 = 2.0;
/// Circles and stars need a radius longer than this to be kept.
pub const MIN_RADIUS: f64 = 2.0;
/// Lines and arrows need to be longer than this to be kept.
pub const MIN_SEGMENT_LENGTH: f64 = 5.0;
/// Pen strokes need at least this many points to be kept.
pub const MIN_PATH_POINTS: usize = 2;
/// Smallest grid spacing drawn; finer settings are raised to this.
pub const MIN_GRID_SIZE: f64 = 2.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Pen,
    Text,
    Eraser,
    Rectangle,
    RoundedRectangle,
    Circle,
    Triangle,
    Line,
    Arrow,
    Star,
}

impl ToolKind {
    /// Tools that drag out a geometric shape from an anchor.
    pub fn is_shape(self) -> bool {
        matches!(
            self,
            ToolKind::Rectangle
                | ToolKind::RoundedRectangle
                | ToolKind::Circle
                | ToolKind::Triangle
                | ToolKind::Line
                | ToolKind::Arrow
                | ToolKind::Star
        )
    }

    /// Tools that produce an in-progress object while the pointer is down.
    pub fn draws(self) -> bool {
        self == ToolKind::Pen || self.is_shape()
    }
}

/// Ambient drawing settings. These are not part of undo history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    pub tool: ToolKind,
    pub stroke_color: SerializableColor,
    pub fill_color: SerializableColor,
    /// Whether new shapes are filled with `fill_color`.
    pub fill_enabled: bool,
    pub pen_width: f64,
    pub shape_stroke_width: f64,
    /// Opacity in percent for new objects.
    pub opacity: u8,
    pub font_size: f64,
    /// Canvas background (None = transparent).
    pub canvas_background: Option<SerializableColor>,
    pub grid_enabled: bool,
    pub grid_size: f64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: ToolKind::default(),
            stroke_color: SerializableColor::black(),
            fill_color: SerializableColor::white(),
            fill_enabled: false,
            pen_width: 2.0,
            shape_stroke_width: 2.0,
            opacity: 100,
            font_size: Text::DEFAULT_FONT_SIZE,
            canvas_background: Some(SerializableColor::white()),
            grid_enabled: false,
            grid_size: 20.0,
        }
    }
}

impl ToolSettings {
    /// Style applied to objects created with `tool`.
    pub fn style_for(&self, tool: ToolKind) -> ShapeStyle {
        let stroke_width = match tool {
            ToolKind::Pen => self.pen_width,
            _ => self.shape_stroke_width,
        };
        let fill_color = (self.fill_enabled && tool.is_shape()).then_some(self.fill_color);
        ShapeStyle {
            stroke_color: self.stroke_color,
            fill_color,
            stroke_width,
            opacity: self.opacity.min(100),
        }
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ToolState {
    /// Waiting for a pointer-down.
    #[default]
    Idle,
    /// A drawing gesture is in progress.
    Active {
        /// Anchor of the gesture.
        start: Point,
        /// Latest pointer position.
        current: Point,
    },
}

/// Tracks the in-progress object for the pen and shape tools.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Settings used for new objects, including the active tool.
    pub settings: ToolSettings,
    state: ToolState,
    freehand_points: Vec<Point>,
}

impl ToolManager {
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            settings,
            state: ToolState::Idle,
            freehand_points: Vec::new(),
        }
    }

    pub fn current_tool(&self) -> ToolKind {
        self.settings.tool
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    /// Switch tools, dropping any in-progress object.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.settings.tool = tool;
        self.cancel();
    }

    /// Begin a drawing gesture. Ignored for tools that do not draw.
    pub fn begin(&mut self, point: Point) {
        if !self.settings.tool.draws() {
            return;
        }
        self.freehand_points.clear();
        if self.settings.tool == ToolKind::Pen {
            self.freehand_points.push(point);
        }
        self.state = ToolState::Active {
            start: point,
            current: point,
        };
    }

    /// Extend the gesture to `point`.
    pub fn update(&mut self, point: Point) {
        if let ToolState::Active { current, .. } = &mut self.state {
            *current = point;
            if self.settings.tool == ToolKind::Pen {
                self.freehand_points.push(point);
            }
        }
    }

    /// Finish the gesture. Returns the object to commit, or None when the
    /// gesture fell below the commit threshold.
    pub fn end(&mut self, point: Point) -> Option<DrawObject> {
        if let ToolState::Active { current, .. } = &mut self.state {
            // The pen only records motion samples.
            if self.settings.tool != ToolKind::Pen {
                *current = point;
            }
        }
        let shape = self.build_shape();
        self.cancel();
        let shape = shape.filter(meets_commit_threshold)?;
        Some(DrawObject::new(shape, self.settings.style_for(self.settings.tool)))
    }

    /// Drop the in-progress object.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
        self.freehand_points.clear();
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Active { .. })
    }

    /// Whether the gesture has moved away from its anchor.
    pub fn has_moved(&self) -> bool {
        match self.state {
            ToolState::Active { start, current } => start != current,
            ToolState::Idle => false,
        }
    }

    /// In-progress object styled with the live settings, regardless of threshold.
    pub fn preview(&self) -> Option<DrawObject> {
        self.build_shape()
            .map(|shape| DrawObject::new(shape, self.settings.style_for(self.settings.tool)))
    }

    fn build_shape(&self) -> Option<Shape> {
        let ToolState::Active { start, current } = self.state else {
            return None;
        };
        let shape = match self.settings.tool {
            ToolKind::Pen => Shape::Freehand(Freehand::new(self.freehand_points.clone())),
            ToolKind::Rectangle => Shape::Rectangle(Rectangle::from_corners(start, current)),
            ToolKind::RoundedRectangle => {
                Shape::RoundedRectangle(Rectangle::from_corners(start, current))
            }
            ToolKind::Circle => Shape::Circle(Circle::new(start, start.distance(current))),
            ToolKind::Star => Shape::Star(Star::new(start, start.distance(current))),
            ToolKind::Triangle => Shape::Triangle(Triangle::from_drag(start, current)),
            ToolKind::Line => Shape::Line(Line::new(start, current)),
            ToolKind::Arrow => Shape::Arrow(Arrow::new(start, current)),
            ToolKind::Select | ToolKind::Text | ToolKind::Eraser => return None,
        };
        Some(shape)
    }
}

/// Minimum-extent check applied on pointer-up.
pub fn meets_commit_threshold(shape: &Shape) -> bool {
    match shape {
        Shape::Freehand(f) => f.len() >= MIN_PATH_POINTS,
        Shape::Rectangle(r) | Shape::RoundedRectangle(r) => {
            r.width.abs() > MIN_RECT_EXTENT || r.height.abs() > MIN_RECT_EXTENT
        }
        Shape::Circle(c) => c.radius > MIN_RADIUS,
        Shape::Star(s) => s.radius > MIN_RADIUS,
        Shape::Line(l) => l.length() > MIN_SEGMENT_LENGTH,
        Shape::Arrow(a) => a.length() > MIN_SEGMENT_LENGTH,
        Shape::Triangle(_) => true,
        Shape::Text(t) => !t.content.is_empty(),
    }
}
