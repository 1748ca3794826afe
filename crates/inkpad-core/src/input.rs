//! Pointer and keyboard events, and the translator that turns pointer
//! gestures into canvas commands.

use crate::document::Document;
use crate::geometry;
use crate::shapes::ShapeId;
use crate::tools::ToolKind;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event in logical canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Move { position: Point },
    Up { position: Point, button: MouseButton },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position, .. } => position,
        }
    }
}

/// A key press. `key` uses the DOM-style key name (`"z"`, `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    pub fn plain(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// The typed character, if this is a single printable key without command modifiers.
    pub fn text(&self) -> Option<char> {
        if self.modifiers.command() || self.modifiers.alt {
            return None;
        }
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(c),
            _ => None,
        }
    }
}

/// Transient interaction mode. Dragging and rotating take precedence over
/// tool dispatch while active.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        id: ShapeId,
        /// Pointer minus object origin at grab time.
        offset: Vec2,
    },
    Rotating {
        id: ShapeId,
        center: Point,
        /// Pointer angle around `center` at the previous event, in degrees.
        last_angle: f64,
    },
    Drawing,
}

/// What a pointer event asks the canvas to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Nothing to do.
    Noop,
    /// Select an object and start dragging it.
    Select { id: ShapeId },
    ClearSelection,
    /// Start a rotation gesture on the selected object.
    BeginRotate { id: ShapeId },
    /// Add `delta` degrees to the object's rotation.
    Rotate { id: ShapeId, delta: f64 },
    /// Move the object so its origin lands at `origin`.
    MoveTo { id: ShapeId, origin: Point },
    /// Remove the object under the eraser.
    Erase { id: ShapeId },
    BeginDraw(Point),
    ExtendDraw(Point),
    FinishDraw(Point),
    /// Open text entry at a baseline position.
    BeginText(Point),
    /// A drag or rotation ended.
    EndGesture,
}

/// Angle of `point` around `center`, in degrees.
fn angle_deg(center: Point, point: Point) -> f64 {
    (point.y - center.y).atan2(point.x - center.x).to_degrees()
}

/// Wrap an angle difference into `(-180, 180]`.
fn wrap_delta(delta: f64) -> f64 {
    let wrapped = delta.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Pointer gesture state machine.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    gesture: Gesture,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    pub fn pointer_down(
        &mut self,
        point: Point,
        tool: ToolKind,
        document: &Document,
        selected: Option<ShapeId>,
    ) -> Command {
        let handle_hit = selected
            .and_then(|id| document.get(id))
            .filter(|obj| geometry::hits_rotation_handle(obj, point));
        if let Some(obj) = handle_hit {
            let center = geometry::rotation_center(obj);
            self.gesture = Gesture::Rotating {
                id: obj.id(),
                center,
                last_angle: angle_deg(center, point),
            };
            return Command::BeginRotate { id: obj.id() };
        }

        match tool {
            ToolKind::Select => match document.hit_test(point).and_then(|id| document.get(id)) {
                Some(obj) => {
                    self.gesture = Gesture::Dragging {
                        id: obj.id(),
                        offset: point - obj.shape.origin(),
                    };
                    Command::Select { id: obj.id() }
                }
                None => Command::ClearSelection,
            },
            ToolKind::Eraser => match document.hit_test(point) {
                Some(id) => Command::Erase { id },
                None => Command::Noop,
            },
            ToolKind::Text => Command::BeginText(point),
            tool if tool.draws() => {
                self.gesture = Gesture::Drawing;
                Command::BeginDraw(point)
            }
            _ => Command::Noop,
        }
    }

    pub fn pointer_move(&mut self, point: Point) -> Command {
        match &mut self.gesture {
            Gesture::Idle => Command::Noop,
            Gesture::Rotating {
                id,
                center,
                last_angle,
            } => {
                let angle = angle_deg(*center, point);
                let delta = wrap_delta(angle - *last_angle);
                *last_angle = angle;
                Command::Rotate { id: *id, delta }
            }
            Gesture::Dragging { id, offset } => Command::MoveTo {
                id: *id,
                origin: point - *offset,
            },
            Gesture::Drawing => Command::ExtendDraw(point),
        }
    }

    pub fn pointer_up(&mut self, point: Point) -> Command {
        let command = match self.gesture {
            Gesture::Idle => Command::Noop,
            Gesture::Drawing => Command::FinishDraw(point),
            Gesture::Dragging { .. } | Gesture::Rotating { .. } => Command::EndGesture,
        };
        self.gesture = Gesture::Idle;
        command
    }

    /// Abandon the current gesture, returning what it was.
    pub fn cancel(&mut self) -> Gesture {
        std::mem::take(&mut self.gesture)
    }
}
