//! Whiteboard configuration.

use crate::error::WhiteboardResult;
use inkpad_core::history::DEFAULT_HISTORY_LIMIT;
use inkpad_core::shapes::{ColorParseError, SerializableColor, Text};
use inkpad_core::surface::FixedSurface;
use inkpad_core::tools::ToolSettings;
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings supplied by the host when opening a whiteboard. Every field
/// has a default, so a partial JSON object is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteboardConfig {
    /// Logical width of the drawing surface.
    pub width: f64,
    /// Logical height of the drawing surface.
    pub height: f64,
    /// Device pixels per logical pixel.
    pub scale_factor: f64,
    /// Hex color, or `"none"` for a transparent canvas.
    pub canvas_background: String,
    pub grid_enabled: bool,
    pub grid_size: f64,
    /// Maximum number of undo steps.
    pub history_limit: usize,
    pub stroke_color: String,
    /// Hex color, or `"none"` to draw shapes unfilled.
    pub fill_color: String,
    pub pen_width: f64,
    pub shape_stroke_width: f64,
    /// Opacity in percent for new objects.
    pub opacity: u8,
    pub font_size: f64,
    /// Outline color of the selected object and its rotation handle.
    pub selection_color: String,
    /// TTF/OTF used to measure and draw text. System fonts are tried when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for WhiteboardConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            scale_factor: 1.0,
            canvas_background: "#ffffff".to_string(),
            grid_enabled: false,
            grid_size: 20.0,
            history_limit: DEFAULT_HISTORY_LIMIT,
            stroke_color: "#000000".to_string(),
            fill_color: "none".to_string(),
            pen_width: 2.0,
            shape_stroke_width: 2.0,
            opacity: 100,
            font_size: Text::DEFAULT_FONT_SIZE,
            selection_color: "#3b82f6".to_string(),
            font_path: None,
        }
    }
}

impl WhiteboardConfig {
    pub fn from_json(json: &str) -> WhiteboardResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> WhiteboardResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn surface(&self) -> FixedSurface {
        FixedSurface::new(self.width, self.height, self.scale_factor)
    }

    pub fn selection_color(&self) -> Result<Color, ColorParseError> {
        SerializableColor::parse(&self.selection_color).map(Color::from)
    }

    /// Initial tool settings described by this configuration.
    pub fn tool_settings(&self) -> Result<ToolSettings, ColorParseError> {
        let fill = SerializableColor::parse_optional(&self.fill_color)?;
        let defaults = ToolSettings::default();
        Ok(ToolSettings {
            stroke_color: SerializableColor::parse(&self.stroke_color)?,
            fill_color: fill.unwrap_or(defaults.fill_color),
            fill_enabled: fill.is_some(),
            pen_width: self.pen_width,
            shape_stroke_width: self.shape_stroke_width,
            opacity: self.opacity.min(100),
            font_size: self.font_size,
            canvas_background: SerializableColor::parse_optional(&self.canvas_background)?,
            grid_enabled: self.grid_enabled,
            grid_size: self.grid_size,
            ..defaults
        })
    }
}
