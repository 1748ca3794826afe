//! Inkpad Render Library
//!
//! Renderer abstraction for the inkpad whiteboard. The default implementation
//! rasterizes on the CPU with tiny-skia, which also backs image export.

pub mod background;
pub mod export;
mod renderer;
mod skia_impl;
pub mod text;

pub use export::{ExportError, ExportedImage};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
pub use skia_impl::SkiaRenderer;
pub use text::GlyphMetrics;
