//! Whiteboard errors.

use inkpad_core::shapes::ColorParseError;
use inkpad_render::RendererError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WhiteboardError {
    #[error("Whiteboard is closed")]
    Closed,
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Invalid color in configuration: {0}")]
    Color(#[from] ColorParseError),
}

pub type WhiteboardResult<T> = Result<T, WhiteboardError>;
