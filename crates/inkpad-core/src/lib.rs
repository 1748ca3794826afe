//! Inkpad Core Library
//!
//! Platform-agnostic data structures and logic for the inkpad whiteboard:
//! draw objects, the geometry kernel, the scene store with undo history and
//! the translation of pointer gestures into scene edits.

pub mod canvas;
pub mod document;
pub mod geometry;
pub mod history;
pub mod input;
pub mod shapes;
pub mod surface;
pub mod text_entry;
pub mod tools;

pub use canvas::{BackgroundImage, Canvas};
pub use document::{Document, ObjectPatch, ZOrder};
pub use history::History;
pub use input::{Command, Gesture, KeyEvent, Modifiers, MouseButton, PointerEvent, Translator};
pub use shapes::{DrawObject, SerializableColor, Shape, ShapeId, ShapeKind, ShapeStyle, TextMeasure};
pub use surface::{FixedSurface, Surface};
pub use text_entry::TextEntry;
pub use tools::{ToolKind, ToolManager, ToolSettings};
