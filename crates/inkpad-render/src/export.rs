//! Flattened raster export.

use crate::renderer::{RenderResult, RendererError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tiny_skia::{Color, Pixmap, PixmapPaint, Transform};

/// Errors produced while exporting. Export never yields partial bytes.
pub type ExportError = RendererError;

/// An encoded PNG of the whiteboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ExportedImage {
    pub const MIME_TYPE: &'static str = "image/png";

    /// `data:image/png;base64,...`
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", Self::MIME_TYPE, STANDARD.encode(&self.png))
    }
}

/// Composite `frame` over solid white and encode the result as PNG.
pub fn export_frame(frame: &Pixmap) -> Result<ExportedImage, ExportError> {
    let (width, height) = (frame.width(), frame.height());
    let mut flat =
        Pixmap::new(width, height).ok_or(RendererError::SurfaceAllocation { width, height })?;
    flat.fill(Color::WHITE);
    flat.draw_pixmap(
        0,
        0,
        frame.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    let png = encode_png(&flat)?;
    log::info!("exported {width}x{height} image ({} bytes)", png.len());
    Ok(ExportedImage { png, width, height })
}

/// Encode a pixmap as 8-bit RGBA PNG.
pub fn encode_png(pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RendererError::Encode(e.to_string()))?;
        writer
            .write_image_data(&rgba)
            .map_err(|e| RendererError::Encode(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| RendererError::Encode(e.to_string()))?;
    }
    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(png: &[u8]) -> image::RgbaImage {
        image::load_from_memory(png).unwrap().to_rgba8()
    }

    #[test]
    fn test_transparent_frame_exports_white() {
        let frame = Pixmap::new(8, 4).unwrap();
        let exported = export_frame(&frame).unwrap();
        assert_eq!((exported.width, exported.height), (8, 4));
        let img = decode(&exported.png);
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_opaque_pixels_survive() {
        let mut frame = Pixmap::new(2, 2).unwrap();
        frame.fill(Color::from_rgba8(255, 0, 0, 255));
        let img = decode(&export_frame(&frame).unwrap().png);
        assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_data_uri() {
        let frame = Pixmap::new(1, 1).unwrap();
        let uri = export_frame(&frame).unwrap().to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }
}
