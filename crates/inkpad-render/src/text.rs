//! Glyph-based text measurement and outlines using ab_glyph.

use crate::renderer::{RenderResult, RendererError};
use ab_glyph::{Font, FontArc, GlyphId, OutlineCurve, PxScale, ScaleFont};
use inkpad_core::shapes::TextMeasure;
use kurbo::Point;
use std::fmt;
use std::path::Path;
use tiny_skia::PathBuilder;

/// Embedded DejaVu Sans, used when no font path is configured.
static BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Fonts tried if the bundled font cannot be parsed.
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Text metrics and outlines from a loaded TTF/OTF font.
#[derive(Clone)]
pub struct GlyphMetrics {
    font: FontArc,
}

impl fmt::Debug for GlyphMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphMetrics").finish_non_exhaustive()
    }
}

impl GlyphMetrics {
    pub fn from_bytes(data: Vec<u8>) -> RenderResult<Self> {
        let font = FontArc::try_from_vec(data).map_err(|e| RendererError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    pub fn from_file(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| RendererError::Font(format!("{}: {e}", path.display())))?;
        Self::from_bytes(data)
    }

    /// The font shipped with the crate.
    pub fn bundled() -> RenderResult<Self> {
        let font =
            FontArc::try_from_slice(BUNDLED_FONT).map_err(|e| RendererError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    /// The bundled font, falling back to system fonts.
    pub fn fallback() -> Option<Self> {
        Self::bundled()
            .inspect_err(|e| log::warn!("bundled font unusable: {e}"))
            .ok()
            .or_else(Self::system_default)
    }

    /// First usable font from the usual system locations.
    pub fn system_default() -> Option<Self> {
        SYSTEM_FONT_PATHS
            .iter()
            .filter(|p| Path::new(p).exists())
            .find_map(|p| match Self::from_file(p) {
                Ok(metrics) => {
                    log::debug!("using system font {p}");
                    Some(metrics)
                }
                Err(e) => {
                    log::warn!("skipping font {p}: {e}");
                    None
                }
            })
    }

    /// Visit each glyph with its pen position, applying kerning.
    fn layout(&self, text: &str, font_size: f64, mut visit: impl FnMut(GlyphId, f32)) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(font_size as f32));
        let mut pen_x = 0.0f32;
        let mut prev: Option<GlyphId> = None;
        for c in text.chars() {
            let id = self.font.glyph_id(c);
            if let Some(prev) = prev {
                pen_x += scaled.kern(prev, id);
            }
            visit(id, pen_x);
            pen_x += scaled.h_advance(id);
            prev = Some(id);
        }
        pen_x
    }

    /// Filled outline of `text` with its baseline starting at `origin`.
    pub fn glyph_path(&self, text: &str, font_size: f64, origin: Point) -> Option<tiny_skia::Path> {
        let scaled = self.font.as_scaled(PxScale::from(font_size as f32));
        let (hs, vs) = (scaled.h_scale_factor(), scaled.v_scale_factor());
        let (ox, oy) = (origin.x as f32, origin.y as f32);
        let mut pb = PathBuilder::new();

        self.layout(text, font_size, |id, pen_x| {
            let Some(outline) = self.font.outline(id) else {
                return;
            };
            let map = |p: ab_glyph::Point| (ox + pen_x + p.x * hs, oy - p.y * vs);
            let mut last: Option<(f32, f32)> = None;
            for curve in &outline.curves {
                let (start, end) = match curve {
                    OutlineCurve::Line(p0, p1) => (*p0, *p1),
                    OutlineCurve::Quad(p0, _, p2) => (*p0, *p2),
                    OutlineCurve::Cubic(p0, _, _, p3) => (*p0, *p3),
                };
                let start = map(start);
                if last != Some(start) {
                    if last.is_some() {
                        pb.close();
                    }
                    pb.move_to(start.0, start.1);
                }
                match curve {
                    OutlineCurve::Line(_, p1) => {
                        let (x, y) = map(*p1);
                        pb.line_to(x, y);
                    }
                    OutlineCurve::Quad(_, c, p2) => {
                        let (cx, cy) = map(*c);
                        let (x, y) = map(*p2);
                        pb.quad_to(cx, cy, x, y);
                    }
                    OutlineCurve::Cubic(_, c1, c2, p3) => {
                        let (c1x, c1y) = map(*c1);
                        let (c2x, c2y) = map(*c2);
                        let (x, y) = map(*p3);
                        pb.cubic_to(c1x, c1y, c2x, c2y, x, y);
                    }
                }
                last = Some(map(end));
            }
            if last.is_some() {
                pb.close();
            }
        });
        pb.finish()
    }
}

impl TextMeasure for GlyphMetrics {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        f64::from(self.layout(text, font_size, |_, _| {}))
    }
}
