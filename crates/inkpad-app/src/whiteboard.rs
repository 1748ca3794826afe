//! The embeddable whiteboard: owns one canvas session between open and close.

use crate::config::WhiteboardConfig;
use crate::error::{WhiteboardError, WhiteboardResult};
use crate::shortcuts::{Action, ShortcutRegistry};
use inkpad_core::canvas::{BackgroundImage, Canvas};
use inkpad_core::input::{KeyEvent, MouseButton, PointerEvent};
use inkpad_core::surface::{FixedSurface, Surface};
use inkpad_core::tools::ToolKind;
use inkpad_render::{ExportedImage, GlyphMetrics, RenderContext, Renderer, SkiaRenderer};
use peniko::Color;
use std::path::Path;
use std::sync::Arc;

/// Host hooks. `on_image` receives the export from [`Whiteboard::generate`];
/// `on_close` runs once when the whiteboard closes for any reason.
pub struct WhiteboardCallbacks {
    pub on_close: Box<dyn FnMut()>,
    pub on_image: Box<dyn FnMut(ExportedImage)>,
}

impl WhiteboardCallbacks {
    pub fn new(
        on_close: impl FnMut() + 'static,
        on_image: impl FnMut(ExportedImage) + 'static,
    ) -> Self {
        Self {
            on_close: Box::new(on_close),
            on_image: Box::new(on_image),
        }
    }
}

impl std::fmt::Debug for WhiteboardCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhiteboardCallbacks").finish_non_exhaustive()
    }
}

struct Session {
    canvas: Canvas,
    renderer: SkiaRenderer,
    surface: FixedSurface,
    selection_color: Color,
    callbacks: WhiteboardCallbacks,
}

impl Session {
    fn render(&mut self) -> WhiteboardResult<()> {
        let ctx = RenderContext::new(&self.canvas, self.surface.logical_size())
            .with_scale_factor(self.surface.scale_factor())
            .with_selection_color(self.selection_color);
        self.renderer.build_scene(&ctx)?;
        Ok(())
    }

    /// Redraw after a state change. A failed redraw keeps the previous frame.
    fn redraw(&mut self) {
        if let Err(e) = self.render() {
            log::warn!("redraw failed, keeping previous frame: {e}");
        }
    }
}

/// A modal whiteboard. Every operation after close fails with
/// [`WhiteboardError::Closed`].
pub struct Whiteboard {
    session: Option<Session>,
}

impl std::fmt::Debug for Whiteboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Whiteboard")
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl Whiteboard {
    /// Create a fresh session: empty document, empty history, selection tool.
    pub fn open(
        config: WhiteboardConfig,
        callbacks: WhiteboardCallbacks,
    ) -> WhiteboardResult<Self> {
        let settings = config.tool_settings()?;
        let selection_color = config.selection_color()?;

        let glyphs = match &config.font_path {
            Some(path) => GlyphMetrics::from_file(path)
                .inspect_err(|e| log::warn!("{e}; using the bundled font"))
                .ok()
                .or_else(GlyphMetrics::fallback),
            None => GlyphMetrics::fallback(),
        };

        let mut canvas = Canvas::new(settings, config.history_limit);
        let mut renderer = SkiaRenderer::new();
        match glyphs {
            Some(glyphs) => {
                canvas = canvas.with_measure(Arc::new(glyphs.clone()));
                renderer = renderer.with_glyphs(glyphs);
            }
            None => log::warn!("no usable font found; text objects will not be drawn"),
        }

        let mut session = Session {
            canvas,
            renderer,
            surface: config.surface(),
            selection_color,
            callbacks,
        };
        session.redraw();
        ShortcutRegistry::log_all();
        log::info!("whiteboard opened ({}x{})", config.width, config.height);
        Ok(Self {
            session: Some(session),
        })
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Whether key presses are currently routed to this whiteboard.
    pub fn has_key_listener(&self) -> bool {
        self.is_open()
    }

    fn session(&self) -> WhiteboardResult<&Session> {
        self.session.as_ref().ok_or(WhiteboardError::Closed)
    }

    fn session_mut(&mut self) -> WhiteboardResult<&mut Session> {
        self.session.as_mut().ok_or(WhiteboardError::Closed)
    }

    pub fn canvas(&self) -> WhiteboardResult<&Canvas> {
        Ok(&self.session()?.canvas)
    }

    /// The renderer holding the last frame.
    pub fn renderer(&self) -> WhiteboardResult<&SkiaRenderer> {
        Ok(&self.session()?.renderer)
    }

    /// Run `f` against the canvas and redraw afterwards.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut Canvas) -> R) -> WhiteboardResult<R> {
        let session = self.session_mut()?;
        let result = f(&mut session.canvas);
        session.redraw();
        Ok(result)
    }

    pub fn set_tool(&mut self, tool: ToolKind) -> WhiteboardResult<()> {
        self.edit(|canvas| canvas.set_tool(tool))
    }

    /// Route a pointer event. Only the primary button starts or ends gestures.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> WhiteboardResult<bool> {
        let session = self.session_mut()?;
        let changed = match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => session.canvas.pointer_down(position),
            PointerEvent::Move { position } => session.canvas.pointer_move(position),
            PointerEvent::Up {
                position,
                button: MouseButton::Left,
            } => session.canvas.pointer_up(position),
            _ => false,
        };
        if changed {
            session.redraw();
        }
        Ok(changed)
    }

    /// Route a key press. Open text entry consumes keys before shortcuts do.
    /// Escape with nothing to cancel closes the whiteboard.
    pub fn handle_key(&mut self, event: &KeyEvent) -> WhiteboardResult<bool> {
        let session = self.session_mut()?;

        if session.canvas.text_entry().is_active() {
            let changed = match event.key.as_str() {
                "Enter" => {
                    session.canvas.commit_text();
                    true
                }
                "Escape" => session.canvas.cancel(),
                "Backspace" => session.canvas.text_backspace(),
                _ => event.text().is_some_and(|c| session.canvas.text_input(c)),
            };
            if changed {
                session.redraw();
            }
            return Ok(changed);
        }

        let Some(action) = ShortcutRegistry::lookup(event) else {
            return Ok(false);
        };
        let canvas = &mut session.canvas;
        let changed = match action {
            Action::Undo => canvas.undo(),
            Action::Redo => canvas.redo(),
            Action::Duplicate => canvas.duplicate_selected().is_some(),
            Action::DeleteSelected => canvas.delete_selected(),
            Action::Reorder(direction) => canvas.reorder_selected(direction),
            Action::Cancel => {
                if !canvas.cancel() {
                    self.close();
                    return Ok(true);
                }
                true
            }
        };
        if changed {
            session.redraw();
        }
        Ok(changed)
    }

    /// Replace or remove the faded reference image. Undecodable bytes leave
    /// the layer blank without failing.
    pub fn set_background_image(&mut self, bytes: Option<Vec<u8>>) -> WhiteboardResult<()> {
        self.edit(|canvas| canvas.set_background_image(bytes.map(BackgroundImage::new)))
    }

    /// Change the logical surface size and redraw.
    pub fn resize(&mut self, width: f64, height: f64) -> WhiteboardResult<()> {
        let session = self.session_mut()?;
        session.surface.resize(width, height);
        session.redraw();
        Ok(())
    }

    pub fn set_scale_factor(&mut self, scale: f64) -> WhiteboardResult<()> {
        let session = self.session_mut()?;
        let logical = session.surface.logical_size();
        session.surface = FixedSurface::new(logical.width, logical.height, scale);
        session.redraw();
        Ok(())
    }

    /// Redraw now, reporting failure instead of keeping the previous frame silently.
    pub fn render(&mut self) -> WhiteboardResult<()> {
        self.session_mut()?.render()
    }

    /// Encode the current frame, flattened onto white. Pending text is
    /// committed first so the caret never reaches the image.
    pub fn export(&mut self) -> WhiteboardResult<ExportedImage> {
        let session = self.session_mut()?;
        if session.canvas.text_entry().is_active() {
            session.canvas.commit_text();
            session.render()?;
        }
        Ok(session.renderer.export()?)
    }

    /// Write the current frame to `path` as PNG.
    pub fn save(&mut self, path: impl AsRef<Path>) -> WhiteboardResult<()> {
        let image = self.export()?;
        std::fs::write(path.as_ref(), &image.png)?;
        log::info!("saved whiteboard to {}", path.as_ref().display());
        Ok(())
    }

    /// Ask the user for a destination and save there. Returns false if the
    /// dialog was dismissed.
    #[cfg(feature = "native")]
    pub fn save_with_dialog(&mut self) -> WhiteboardResult<bool> {
        let image = self.export()?;
        let Some(path) = rfd::FileDialog::new()
            .set_title("Save Whiteboard")
            .set_file_name("whiteboard.png")
            .add_filter("PNG Image", &["png"])
            .save_file()
        else {
            return Ok(false);
        };
        if let Err(e) = std::fs::write(&path, &image.png) {
            log::error!("Failed to save PNG: {e}");
            return Err(e.into());
        }
        log::info!("saved whiteboard to {}", path.display());
        Ok(true)
    }

    /// Export the whiteboard, hand the image to the host, then close.
    /// On failure nothing is delivered and the whiteboard stays open.
    pub fn generate(&mut self) -> WhiteboardResult<()> {
        let image = self.export()?;
        let session = self.session_mut()?;
        (session.callbacks.on_image)(image);
        self.close();
        Ok(())
    }

    /// Close the whiteboard and discard its state. Returns false if already closed.
    pub fn close(&mut self) -> bool {
        let Some(mut session) = self.session.take() else {
            return false;
        };
        (session.callbacks.on_close)();
        log::info!(
            "whiteboard closed with {} objects",
            session.canvas.document.len()
        );
        true
    }
}
