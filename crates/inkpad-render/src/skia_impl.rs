//! CPU rasterizer backend built on tiny-skia.

use crate::background::BackgroundCache;
use crate::export::{ExportError, ExportedImage, export_frame};
use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError};
use crate::text::GlyphMetrics;
use inkpad_core::geometry;
use inkpad_core::tools::MIN_GRID_SIZE;
use inkpad_core::canvas::Canvas;
use inkpad_core::shapes::{
    ApproximateMetrics, DrawObject, SerializableColor, Shape, ShapeId, Text,
};
use kurbo::{Affine, BezPath, PathEl, Point, Rect, Size};
use tiny_skia::{
    Color, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    Stroke, StrokeDash, Transform,
};

/// Opacity of the background reference image.
const BACKGROUND_IMAGE_OPACITY: f32 = 0.3;
/// Dash pattern of the selection outline, in logical pixels.
const SELECTION_DASH: [f32; 2] = [6.0, 4.0];

fn skia_color(color: SerializableColor, opacity: f32) -> Color {
    let mut c = Color::from_rgba8(color.r, color.g, color.b, color.a);
    c.apply_opacity(opacity);
    c
}

fn to_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

/// Convert a kurbo path into a tiny-skia path. Empty paths yield None.
pub(crate) fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32)
            }
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn rect_path(rect: Rect) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(rect.x0 as f32, rect.y0 as f32);
    pb.line_to(rect.x1 as f32, rect.y0 as f32);
    pb.line_to(rect.x1 as f32, rect.y1 as f32);
    pb.line_to(rect.x0 as f32, rect.y1 as f32);
    pb.close();
    pb.finish()
}

fn fill(pixmap: &mut Pixmap, path: &tiny_skia::Path, color: Color, transform: Transform) {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    pixmap.fill_path(path, &paint, FillRule::Winding, transform, None);
}

fn stroke(
    pixmap: &mut Pixmap,
    path: &tiny_skia::Path,
    color: Color,
    stroke: &Stroke,
    transform: Transform,
) {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    pixmap.stroke_path(path, &paint, stroke, transform, None);
}

fn round_stroke(width: f64) -> Stroke {
    Stroke {
        width: width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

/// Software renderer that redraws the whole canvas into a pixmap.
pub struct SkiaRenderer {
    frame: Option<Pixmap>,
    background: BackgroundCache,
    glyphs: Option<GlyphMetrics>,
    paint_order: Vec<ShapeId>,
}

impl Default for SkiaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SkiaRenderer {
    /// Create a renderer without a font; text objects are not drawn.
    pub fn new() -> Self {
        Self {
            frame: None,
            background: BackgroundCache::new(),
            glyphs: None,
            paint_order: Vec::new(),
        }
    }

    /// Draw text objects with the given font.
    pub fn with_glyphs(mut self, glyphs: GlyphMetrics) -> Self {
        self.glyphs = Some(glyphs);
        self
    }

    pub fn glyphs(&self) -> Option<&GlyphMetrics> {
        self.glyphs.as_ref()
    }

    /// The last successfully rendered frame.
    pub fn frame(&self) -> Option<&Pixmap> {
        self.frame.as_ref()
    }

    /// Ids of committed objects in the order the last frame painted them.
    pub fn paint_order(&self) -> &[ShapeId] {
        &self.paint_order
    }

    /// Flatten the last frame onto white and encode it.
    pub fn export(&self) -> Result<ExportedImage, ExportError> {
        let frame = self.frame.as_ref().ok_or(RendererError::NotRendered)?;
        export_frame(frame)
    }

    fn render_background_image(
        &mut self,
        pixmap: &mut Pixmap,
        ctx: &RenderContext,
        base: Transform,
    ) {
        let Some(image) = ctx.canvas.background_image() else {
            self.background.clear();
            return;
        };
        let Some(bg) = self.background.get(image) else {
            return;
        };
        let sx = (ctx.viewport_size.width / f64::from(bg.width())) as f32;
        let sy = (ctx.viewport_size.height / f64::from(bg.height())) as f32;
        let paint = PixmapPaint {
            opacity: BACKGROUND_IMAGE_OPACITY,
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        let transform = Transform::from_scale(sx, sy).post_concat(base);
        pixmap.draw_pixmap(0, 0, bg.as_ref(), &paint, transform, None);
    }

    fn render_grid(
        pixmap: &mut Pixmap,
        size: Size,
        grid_size: f64,
        background: Option<SerializableColor>,
        base: Transform,
    ) {
        if grid_size <= 0.0 {
            return;
        }
        let grid_size = grid_size.max(MIN_GRID_SIZE);
        let light = background.is_none_or(|c| c.brightness() > 0.5);
        let color = if light {
            Color::from_rgba8(0, 0, 0, 28)
        } else {
            Color::from_rgba8(255, 255, 255, 28)
        };

        let mut pb = PathBuilder::new();
        let mut x = 0.0;
        while x <= size.width {
            pb.move_to(x as f32, 0.0);
            pb.line_to(x as f32, size.height as f32);
            x += grid_size;
        }
        let mut y = 0.0;
        while y <= size.height {
            pb.move_to(0.0, y as f32);
            pb.line_to(size.width as f32, y as f32);
            y += grid_size;
        }
        if let Some(path) = pb.finish() {
            let grid_stroke = Stroke {
                width: 1.0,
                ..Default::default()
            };
            stroke(pixmap, &path, color, &grid_stroke, base);
        }
    }

    fn render_object(&self, pixmap: &mut Pixmap, obj: &DrawObject, base: Transform) {
        let transform = base.pre_concat(to_transform(geometry::rotation_transform(obj)));
        let opacity = obj.style.opacity_factor();
        let stroke_color = skia_color(obj.style.stroke_color, opacity);
        let line = round_stroke(obj.style.stroke_width);

        match &obj.shape {
            Shape::Text(text) => {
                let Some(glyphs) = &self.glyphs else {
                    return;
                };
                let outline = glyphs.glyph_path(&text.content, text.font_size, text.position);
                if let Some(path) = outline {
                    fill(pixmap, &path, stroke_color, transform);
                }
            }
            Shape::Arrow(arrow) => {
                if let Some(shaft) = to_skia_path(&obj.shape.to_path()) {
                    stroke(pixmap, &shaft, stroke_color, &line, transform);
                }
                if let Some(head) = to_skia_path(&arrow.head_path(obj.style.stroke_width)) {
                    fill(pixmap, &head, stroke_color, transform);
                }
            }
            shape => {
                let Some(path) = to_skia_path(&shape.to_path()) else {
                    return;
                };
                if let Some(fill_color) = obj.effective_fill() {
                    fill(pixmap, &path, skia_color(fill_color, opacity), transform);
                }
                stroke(pixmap, &path, stroke_color, &line, transform);
            }
        }
    }

    /// Uncommitted text plus a caret after its last character.
    fn render_text_entry(
        &self,
        pixmap: &mut Pixmap,
        canvas: &Canvas,
        position: Point,
        base: Transform,
    ) {
        let settings = canvas.settings();
        let color = skia_color(settings.stroke_color, f32::from(settings.opacity.min(100)) / 100.0);
        let content = canvas.text_entry().text().to_string();
        let mut text = Text::new(position, content, settings.font_size);
        match &self.glyphs {
            Some(glyphs) => {
                text.measure(glyphs);
                if let Some(path) = glyphs.glyph_path(&text.content, text.font_size, position) {
                    fill(pixmap, &path, color, base);
                }
            }
            None => text.measure(&ApproximateMetrics),
        }

        let caret_x = (position.x + text.width()) as f32;
        let mut pb = PathBuilder::new();
        pb.move_to(caret_x, (position.y - text.font_size) as f32);
        pb.line_to(caret_x, position.y as f32);
        if let Some(caret) = pb.finish() {
            let caret_stroke = Stroke {
                width: 1.0,
                ..Default::default()
            };
            stroke(pixmap, &caret, color, &caret_stroke, base);
        }
    }

    fn render_selection(pixmap: &mut Pixmap, obj: &DrawObject, color: Color, base: Transform) {
        let transform = base.pre_concat(to_transform(geometry::rotation_transform(obj)));
        if let Some(outline) = rect_path(geometry::bounding_box(obj)) {
            let dashed = Stroke {
                width: 1.0,
                dash: StrokeDash::new(SELECTION_DASH.to_vec(), 0.0),
                ..Default::default()
            };
            stroke(pixmap, &outline, color, &dashed, transform);
        }

        let handle = geometry::rotation_handle_position(obj);
        if let Some(circle) = PathBuilder::from_circle(
            handle.x as f32,
            handle.y as f32,
            geometry::ROTATION_HANDLE_RADIUS as f32,
        ) {
            fill(pixmap, &circle, color, base);
        }
    }
}

impl Renderer for SkiaRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        let (width, height) = ctx.physical_size();
        let mut pixmap = match self.frame.take() {
            Some(p) if p.width() == width && p.height() == height => p,
            previous => match Pixmap::new(width, height) {
                Some(p) => p,
                None => {
                    self.frame = previous;
                    return Err(RendererError::SurfaceAllocation { width, height });
                }
            },
        };

        let canvas = ctx.canvas;
        let settings = canvas.settings();
        let base = Transform::from_scale(ctx.scale_factor as f32, ctx.scale_factor as f32);

        match settings.canvas_background {
            Some(color) => pixmap.fill(skia_color(color, 1.0)),
            None => pixmap.fill(Color::TRANSPARENT),
        }

        self.render_background_image(&mut pixmap, ctx, base);

        if settings.grid_enabled {
            Self::render_grid(
                &mut pixmap,
                ctx.viewport_size,
                settings.grid_size,
                settings.canvas_background,
                base,
            );
        }

        self.paint_order.clear();
        for obj in canvas.document.ordered() {
            self.render_object(&mut pixmap, obj, base);
            self.paint_order.push(obj.id());
        }

        if let Some(obj) = canvas.selected_object() {
            let color = skia_color(ctx.selection_color.into(), 1.0);
            Self::render_selection(&mut pixmap, obj, color, base);
        }

        if let Some(preview) = canvas.preview() {
            self.render_object(&mut pixmap, &preview, base);
        }

        if let Some(position) = canvas.text_entry().position() {
            self.render_text_entry(&mut pixmap, canvas, position, base);
        }

        self.frame = Some(pixmap);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::tests::{init_logger, png_bytes};
    use inkpad_core::canvas::{BackgroundImage, Canvas};
    use inkpad_core::document::ZOrder;
    use inkpad_core::shapes::{Circle, Rectangle, ShapeStyle};
    use inkpad_core::tools::ToolKind;
    use kurbo::Point;

    const RED: SerializableColor = SerializableColor::new(255, 0, 0, 255);

    fn red_circle(center: Point, radius: f64) -> DrawObject {
        DrawObject::new(
            Shape::Circle(Circle::new(center, radius)),
            ShapeStyle {
                stroke_color: RED,
                fill_color: Some(RED),
                ..ShapeStyle::default()
            },
        )
    }

    fn render(canvas: &Canvas, size: f64) -> SkiaRenderer {
        let mut renderer = SkiaRenderer::new();
        let ctx = RenderContext::new(canvas, Size::new(size, size));
        renderer.build_scene(&ctx).unwrap();
        renderer
    }

    fn pixel(renderer: &SkiaRenderer, x: u32, y: u32) -> [u8; 4] {
        let c = renderer.frame().unwrap().pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    #[test]
    fn test_paint_order_is_deterministic() {
        let mut canvas = Canvas::default();
        let a = canvas.add_object(red_circle(Point::new(10.0, 10.0), 5.0));
        let b = canvas.add_object(red_circle(Point::new(20.0, 10.0), 5.0));
        let c = canvas.add_object(red_circle(Point::new(30.0, 10.0), 5.0));
        canvas.reorder(a, ZOrder::Front);
        canvas.reorder(c, ZOrder::Back);

        let mut renderer = SkiaRenderer::new();
        let ctx = RenderContext::new(&canvas, Size::new(50.0, 50.0));
        renderer.build_scene(&ctx).unwrap();
        let first = renderer.paint_order().to_vec();
        renderer.build_scene(&ctx).unwrap();
        assert_eq!(first, renderer.paint_order());
        assert_eq!(first, vec![c, b, a]);
    }

    #[test]
    fn test_background_fill() {
        let mut canvas = Canvas::default();
        assert_eq!(pixel(&render(&canvas, 10.0), 0, 0), [255, 255, 255, 255]);
        canvas.settings_mut().canvas_background = None;
        assert_eq!(pixel(&render(&canvas, 10.0), 0, 0)[3], 0);
    }

    #[test]
    fn test_export_transparent_background_is_white() {
        let mut canvas = Canvas::default();
        canvas.settings_mut().canvas_background = None;
        canvas.add_object(red_circle(Point::new(50.0, 50.0), 20.0));
        let renderer = render(&canvas, 100.0);
        assert_eq!(pixel(&renderer, 2, 2)[3], 0);

        let exported = renderer.export().unwrap();
        let img = image::load_from_memory(&exported.png).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(2, 2).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(50, 50).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_export_before_render_fails() {
        assert!(matches!(SkiaRenderer::new().export(), Err(RendererError::NotRendered)));
    }

    #[test]
    fn test_opacity_scales_alpha() {
        let mut canvas = Canvas::default();
        canvas.settings_mut().canvas_background = None;
        let mut obj = red_circle(Point::new(50.0, 50.0), 20.0);
        obj.style.opacity = 50;
        canvas.add_object(obj);
        let alpha = pixel(&render(&canvas, 100.0), 50, 50)[3];
        assert!((i32::from(alpha) - 128).abs() <= 2, "alpha {alpha}");
    }

    #[test]
    fn test_rotation_about_center() {
        let mut canvas = Canvas::default();
        let mut obj = DrawObject::new(
            Shape::Rectangle(Rectangle::new(Point::new(0.0, 40.0), 100.0, 20.0)),
            ShapeStyle {
                fill_color: Some(RED),
                stroke_color: RED,
                ..ShapeStyle::default()
            },
        );
        obj.rotation = 90.0;
        canvas.add_object(obj);
        let renderer = render(&canvas, 100.0);
        assert_eq!(pixel(&renderer, 50, 90), [255, 0, 0, 255]);
        assert_eq!(pixel(&renderer, 90, 50), [255, 255, 255, 255]);
    }

    #[test]
    fn test_selection_handle_painted() {
        let mut canvas = Canvas::default();
        let id = canvas.add_object(red_circle(Point::new(40.0, 40.0), 10.0));
        let before = pixel(&render(&canvas, 100.0), 55, 25);
        assert_eq!(before, [255, 255, 255, 255]);

        canvas.select(id);
        // Handle at (50, 30) + (5, -5).
        assert_eq!(pixel(&render(&canvas, 100.0), 55, 25), [59, 130, 246, 255]);
    }

    #[test]
    fn test_preview_painted_above_objects() {
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Pen);
        canvas.settings_mut().pen_width = 6.0;
        canvas.pointer_down(Point::new(10.0, 50.0));
        canvas.pointer_move(Point::new(90.0, 50.0));
        let renderer = render(&canvas, 100.0);
        assert!(renderer.paint_order().is_empty());
        assert_eq!(pixel(&renderer, 50, 50), [0, 0, 0, 255]);
    }

    #[test]
    fn test_corrupt_background_image_keeps_scene() {
        init_logger();
        let mut canvas = Canvas::default();
        canvas.add_object(red_circle(Point::new(50.0, 50.0), 20.0));
        canvas.set_background_image(Some(BackgroundImage::new(vec![0u8; 16])));
        let renderer = render(&canvas, 100.0);
        assert_eq!(pixel(&renderer, 50, 50), [255, 0, 0, 255]);
        assert_eq!(pixel(&renderer, 2, 2), [255, 255, 255, 255]);
    }

    #[test]
    fn test_background_image_is_faded() {
        let mut canvas = Canvas::default();
        canvas.settings_mut().canvas_background = None;
        let image = BackgroundImage::new(png_bytes(10, 10, [0, 0, 255, 255]));
        canvas.set_background_image(Some(image));
        let [_, _, blue, alpha] = pixel(&render(&canvas, 40.0), 20, 20);
        assert!((i32::from(alpha) - 77).abs() <= 2, "alpha {alpha}");
        assert!(blue > 200);
    }

    #[test]
    fn test_grid_lines_drawn() {
        let mut canvas = Canvas::default();
        canvas.settings_mut().grid_enabled = true;
        let renderer = render(&canvas, 100.0);
        let white = [255, 255, 255, 255];
        assert!(pixel(&renderer, 19, 10) != white || pixel(&renderer, 20, 10) != white);
        assert_eq!(pixel(&renderer, 10, 10), white);
    }

    #[test]
    fn test_tiny_grid_size_is_clamped() {
        let mut canvas = Canvas::default();
        canvas.settings_mut().grid_enabled = true;
        canvas.settings_mut().grid_size = 0.0001;
        let tiny = render(&canvas, 50.0);
        canvas.settings_mut().grid_size = MIN_GRID_SIZE;
        let clamped = render(&canvas, 50.0);
        assert_eq!(tiny.frame().unwrap().data(), clamped.frame().unwrap().data());
    }

    #[test]
    fn test_text_painted_with_bundled_font() {
        let mut canvas = Canvas::default();
        let text = Text::new(Point::new(10.0, 40.0), "H".to_string(), 30.0);
        canvas.add_object(DrawObject::new(Shape::Text(text), ShapeStyle::default()));

        let mut renderer = SkiaRenderer::new().with_glyphs(GlyphMetrics::bundled().unwrap());
        let ctx = RenderContext::new(&canvas, Size::new(60.0, 60.0));
        renderer.build_scene(&ctx).unwrap();
        let inked = (10..40)
            .flat_map(|x| (15..40).map(move |y| (x, y)))
            .filter(|&(x, y)| pixel(&renderer, x, y)[0] < 128)
            .count();
        assert!(inked > 20, "{inked} dark pixels");
    }

    #[test]
    fn test_pending_text_shows_caret() {
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Text);
        canvas.pointer_down(Point::new(20.0, 40.0));
        canvas.pointer_up(Point::new(20.0, 40.0));
        assert!(canvas.text_entry().is_active());

        // Without a font the caret sits at the entry position.
        let renderer = render(&canvas, 100.0);
        assert!(pixel(&renderer, 20, 30)[0] < 200);
        assert_eq!(pixel(&renderer, 60, 30), [255, 255, 255, 255]);
    }

    #[test]
    fn test_scale_factor_sizes_frame() {
        let canvas = Canvas::default();
        let mut renderer = SkiaRenderer::new();
        let ctx = RenderContext::new(&canvas, Size::new(100.0, 50.0)).with_scale_factor(2.0);
        renderer.build_scene(&ctx).unwrap();
        let frame = renderer.frame().unwrap();
        assert_eq!((frame.width(), frame.height()), (200, 100));
    }
}
