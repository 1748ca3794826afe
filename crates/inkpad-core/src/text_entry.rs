//! Single-line inline text entry.

use kurbo::Point;

/// Pending text insertion: where the label goes and what has been typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextEntry {
    position: Option<Point>,
    buffer: String,
}

impl TextEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open entry at a baseline position, discarding any previous buffer.
    pub fn begin(&mut self, position: Point) {
        self.position = Some(position);
        self.buffer.clear();
    }

    pub fn is_active(&self) -> bool {
        self.position.is_some()
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Append a character. Ignored when no entry is open.
    pub fn insert_char(&mut self, c: char) -> bool {
        if self.position.is_none() || c.is_control() {
            return false;
        }
        self.buffer.push(c);
        true
    }

    pub fn insert_str(&mut self, s: &str) -> bool {
        if self.position.is_none() {
            return false;
        }
        self.buffer.extend(s.chars().filter(|c| !c.is_control()));
        true
    }

    /// Delete the last character.
    pub fn backspace(&mut self) -> bool {
        self.position.is_some() && self.buffer.pop().is_some()
    }

    /// Close entry and hand back the position and typed text.
    pub fn take(&mut self) -> Option<(Point, String)> {
        let position = self.position.take()?;
        Some((position, std::mem::take(&mut self.buffer)))
    }

    /// Close entry without producing anything.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        self.position = None;
        self.buffer.clear();
        was_active
    }
}
