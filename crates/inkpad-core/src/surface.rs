//! Drawing surface capability supplied by the host.

use kurbo::Size;
use serde::{Deserialize, Serialize};

/// The visible canvas the whiteboard draws into.
pub trait Surface {
    /// Size in logical pixels; pointer coordinates use this space.
    fn logical_size(&self) -> Size;

    /// Device pixels per logical pixel.
    fn scale_factor(&self) -> f64;

    /// Size in device pixels, rounded up.
    fn physical_size(&self) -> (u32, u32) {
        let size = self.logical_size();
        let scale = self.scale_factor();
        (
            (size.width * scale).ceil().max(1.0) as u32,
            (size.height * scale).ceil().max(1.0) as u32,
        )
    }
}

/// A surface with a fixed size, resized explicitly by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedSurface {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl FixedSurface {
    pub fn new(width: f64, height: f64, scale: f64) -> Self {
        Self {
            width,
            height,
            scale: if scale > 0.0 { scale } else { 1.0 },
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }
}

impl Default for FixedSurface {
    fn default() -> Self {
        Self::new(800.0, 600.0, 1.0)
    }
}

impl Surface for FixedSurface {
    fn logical_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn scale_factor(&self) -> f64 {
        self.scale
    }
}
