//! Decoding and caching of the background reference image.

use crate::renderer::{RenderResult, RendererError};
use inkpad_core::canvas::BackgroundImage;
use tiny_skia::{ColorU8, Pixmap};
use uuid::Uuid;

/// Decode encoded image bytes (PNG, JPEG or WebP) into a premultiplied pixmap.
pub fn decode_image(bytes: &[u8]) -> RenderResult<Pixmap> {
    let rgba = image::load_from_memory(bytes)
        .map_err(|e| RendererError::Decode(e.to_string()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixmap =
        Pixmap::new(width, height).ok_or(RendererError::SurfaceAllocation { width, height })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Holds the decoded pixels of the current background image.
///
/// A failed decode is remembered too, so a corrupt image is reported once
/// rather than on every redraw.
#[derive(Default)]
pub struct BackgroundCache {
    id: Option<Uuid>,
    pixmap: Option<Pixmap>,
}

impl BackgroundCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoded pixels for `image`, or None if it cannot be decoded.
    pub fn get(&mut self, image: &BackgroundImage) -> Option<&Pixmap> {
        if self.id != Some(image.id()) {
            self.id = Some(image.id());
            self.pixmap = match decode_image(image.bytes()) {
                Ok(pixmap) => {
                    log::debug!("decoded background {}x{}", pixmap.width(), pixmap.height());
                    Some(pixmap)
                }
                Err(e) => {
                    log::warn!("skipping background image: {e}");
                    None
                }
            };
        }
        self.pixmap.as_ref()
    }

    pub fn clear(&mut self) {
        self.id = None;
        self.pixmap = None;
    }
}
