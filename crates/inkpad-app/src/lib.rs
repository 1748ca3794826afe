//! Inkpad application layer.
//!
//! Wraps a canvas session behind a modal [`Whiteboard`]: open it with a
//! configuration and host callbacks, route pointer and key events into it,
//! and take a PNG out with [`Whiteboard::generate`].

pub mod config;
pub mod error;
pub mod shortcuts;
pub mod whiteboard;

pub use config::WhiteboardConfig;
pub use error::{WhiteboardError, WhiteboardResult};
pub use shortcuts::{Action, Shortcut, ShortcutRegistry};
pub use whiteboard::{Whiteboard, WhiteboardCallbacks};
