//! Renderer trait abstraction.

use inkpad_core::canvas::Canvas;
use kurbo::Size;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Cannot allocate a {width}x{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },
    #[error("Nothing has been rendered yet")]
    NotRendered,
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Font error: {0}")]
    Font(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The canvas to render.
    pub canvas: &'a Canvas,
    /// Surface size in logical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Selection outline and rotation handle color.
    pub selection_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(canvas: &'a Canvas, viewport_size: Size) -> Self {
        Self {
            canvas,
            viewport_size,
            scale_factor: 1.0,
            selection_color: Color::from_rgba8(59, 130, 246, 255),
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        self
    }

    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    /// Frame size in device pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        (
            (self.viewport_size.width * self.scale_factor).ceil().max(1.0) as u32,
            (self.viewport_size.height * self.scale_factor).ceil().max(1.0) as u32,
        )
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send {
    /// Redraw the whole frame from the canvas.
    ///
    /// On error the previously rendered frame is left untouched.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;
}
