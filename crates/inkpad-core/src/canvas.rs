//! Canvas state: the document, its history, the selection and the
//! transient interaction state that sits around them.

use crate::document::{Document, ObjectPatch, ZOrder};
use crate::history::{DEFAULT_HISTORY_LIMIT, History};
use crate::input::{Command, Gesture, Translator};
use crate::shapes::{
    ApproximateMetrics, DrawObject, Shape, ShapeId, ShapeStyle, Text, TextMeasure,
};
use crate::text_entry::TextEntry;
use crate::tools::{ToolKind, ToolManager, ToolSettings};
use kurbo::Point;
use std::sync::Arc;
use uuid::Uuid;

/// Encoded reference image shown beneath the drawing. The canvas never
/// decodes it; the renderer caches the decoded pixels by `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundImage {
    id: Uuid,
    bytes: Arc<[u8]>,
}

impl BackgroundImage {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            bytes: bytes.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Pre-gesture state of a drag or rotation, recorded into history when the
/// gesture ends having changed something.
#[derive(Debug, Clone)]
struct PendingGesture {
    snapshot: Vec<DrawObject>,
    changed: bool,
}

/// The whiteboard's editable state.
#[derive(Debug, Clone)]
pub struct Canvas {
    /// Committed objects.
    pub document: Document,
    /// Tools and ambient settings.
    pub tool_manager: ToolManager,
    history: History,
    selected: Option<ShapeId>,
    translator: Translator,
    pending: Option<PendingGesture>,
    text_entry: TextEntry,
    background_image: Option<BackgroundImage>,
    measure: Arc<dyn TextMeasure>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(ToolSettings::default(), DEFAULT_HISTORY_LIMIT)
    }
}

impl Canvas {
    pub fn new(settings: ToolSettings, history_limit: usize) -> Self {
        Self {
            document: Document::new(),
            tool_manager: ToolManager::new(settings),
            history: History::new(history_limit),
            selected: None,
            translator: Translator::new(),
            pending: None,
            text_entry: TextEntry::new(),
            background_image: None,
            measure: Arc::new(ApproximateMetrics),
        }
    }

    /// Use `measure` for text objects created from now on.
    pub fn with_measure(mut self, measure: Arc<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.tool_manager.settings
    }

    pub fn settings_mut(&mut self) -> &mut ToolSettings {
        &mut self.tool_manager.settings
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    pub fn selected_object(&self) -> Option<&DrawObject> {
        self.selected.and_then(|id| self.document.get(id))
    }

    /// Select an existing object. Returns false for unknown ids.
    pub fn select(&mut self, id: ShapeId) -> bool {
        if !self.document.contains(id) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn text_entry(&self) -> &TextEntry {
        &self.text_entry
    }

    pub fn background_image(&self) -> Option<&BackgroundImage> {
        self.background_image.as_ref()
    }

    /// Set or remove the reference image. Not recorded in history.
    pub fn set_background_image(&mut self, image: Option<BackgroundImage>) {
        self.background_image = image;
    }

    /// In-progress pen stroke or shape, if a draw gesture is active.
    pub fn preview(&self) -> Option<DrawObject> {
        self.tool_manager.preview()
    }

    pub fn is_gesture_active(&self) -> bool {
        self.translator.is_active()
    }

    pub fn gesture(&self) -> Gesture {
        self.translator.gesture()
    }

    /// Switch tools, dropping the in-progress gesture and any pending text.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.cancel_gesture();
        self.text_entry.cancel();
        self.tool_manager.set_tool(tool);
    }

    // --- Pointer input -------------------------------------------------

    /// Returns true when the surface needs a redraw.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        let mut redraw = false;
        if self.translator.is_active() {
            redraw |= self.pointer_up(point);
        }
        if self.text_entry.is_active() {
            redraw |= self.commit_text().is_some();
        }
        let command = self.translator.pointer_down(
            point,
            self.tool_manager.current_tool(),
            &self.document,
            self.selected,
        );
        self.apply(command) || redraw
    }

    pub fn pointer_move(&mut self, point: Point) -> bool {
        let command = self.translator.pointer_move(point);
        self.apply(command)
    }

    pub fn pointer_up(&mut self, point: Point) -> bool {
        let command = self.translator.pointer_up(point);
        self.apply(command)
    }

    fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Noop => false,
            Command::Select { id } => {
                self.selected = Some(id);
                self.begin_pending();
                true
            }
            Command::ClearSelection => self.selected.take().is_some(),
            Command::BeginRotate { .. } => {
                self.begin_pending();
                false
            }
            Command::Rotate { id, delta } => {
                if delta == 0.0 {
                    return false;
                }
                let Some(obj) = self.document.get_mut(id) else {
                    return false;
                };
                obj.rotation += delta;
                self.mark_changed();
                true
            }
            Command::MoveTo { id, origin } => {
                if self.document.get(id).map(|o| o.shape.origin()) == Some(origin) {
                    return false;
                }
                let moved = self.document.update(id, &ObjectPatch::origin(origin));
                if moved {
                    self.mark_changed();
                }
                moved
            }
            Command::Erase { id } => self.remove_object(id),
            Command::BeginDraw(point) => {
                self.tool_manager.begin(point);
                true
            }
            Command::ExtendDraw(point) => {
                self.tool_manager.update(point);
                true
            }
            Command::FinishDraw(point) => {
                match self.tool_manager.end(point) {
                    Some(obj) => {
                        self.history.save(&self.document);
                        self.document.add(obj);
                    }
                    None => log::trace!("discarded sub-threshold gesture"),
                }
                true
            }
            Command::BeginText(point) => {
                self.text_entry.begin(point);
                true
            }
            Command::EndGesture => {
                self.finish_pending();
                false
            }
        }
    }

    fn begin_pending(&mut self) {
        self.pending = Some(PendingGesture {
            snapshot: self.document.snapshot(),
            changed: false,
        });
    }

    fn mark_changed(&mut self) {
        if let Some(pending) = &mut self.pending {
            pending.changed = true;
        }
    }

    fn finish_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            if pending.changed {
                self.history.push_snapshot(pending.snapshot);
            }
        }
    }

    /// Abort the current gesture. A drag or rotation already applied is
    /// rolled back without touching history. Returns true if a gesture was active.
    pub fn cancel_gesture(&mut self) -> bool {
        let gesture = self.translator.cancel();
        self.tool_manager.cancel();
        if let Some(pending) = self.pending.take() {
            if pending.changed {
                self.document.restore(pending.snapshot);
            }
        }
        gesture != Gesture::Idle
    }

    /// Escape: close text entry, or abort the gesture. Returns false when
    /// there was nothing to cancel.
    pub fn cancel(&mut self) -> bool {
        self.text_entry.cancel() || self.cancel_gesture()
    }

    // --- Scene operations, each recorded in history ---------------------

    /// Add an object on top of the scene.
    pub fn add_object(&mut self, mut obj: DrawObject) -> ShapeId {
        if let Some(text) = obj.shape.as_text_mut() {
            text.measure(self.measure.as_ref());
        }
        self.history.save(&self.document);
        self.document.add(obj)
    }

    /// Remove an object. Unknown ids leave history untouched.
    pub fn remove_object(&mut self, id: ShapeId) -> bool {
        if !self.document.contains(id) {
            return false;
        }
        self.history.save(&self.document);
        self.document.remove(id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        true
    }

    /// Merge a patch into an object.
    pub fn update_object(&mut self, id: ShapeId, patch: &ObjectPatch) -> bool {
        if !self.document.contains(id) {
            return false;
        }
        self.history.save(&self.document);
        self.document.update(id, patch);
        if patch.affects_text_width() {
            let measure = Arc::clone(&self.measure);
            if let Some(text) = self.document.get_mut(id).and_then(|o| o.shape.as_text_mut()) {
                text.measure(measure.as_ref());
            }
        }
        true
    }

    /// Patch the selected object, e.g. from a color or opacity control.
    pub fn update_selected(&mut self, patch: &ObjectPatch) -> bool {
        match self.selected {
            Some(id) => self.update_object(id, patch),
            None => false,
        }
    }

    /// Change an object's paint order. No history entry when nothing moves.
    pub fn reorder(&mut self, id: ShapeId, direction: ZOrder) -> bool {
        let snapshot = self.document.snapshot();
        if self.document.reorder(id, direction) {
            self.history.push_snapshot(snapshot);
            true
        } else {
            false
        }
    }

    pub fn reorder_selected(&mut self, direction: ZOrder) -> bool {
        match self.selected {
            Some(id) => self.reorder(id, direction),
            None => false,
        }
    }

    /// Copy an object and select the copy.
    pub fn duplicate(&mut self, id: ShapeId) -> Option<ShapeId> {
        if !self.document.contains(id) {
            return None;
        }
        self.history.save(&self.document);
        let copy = self.document.duplicate(id)?;
        self.selected = Some(copy);
        Some(copy)
    }

    pub fn duplicate_selected(&mut self) -> Option<ShapeId> {
        self.duplicate(self.selected?)
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selected {
            Some(id) => self.remove_object(id),
            None => false,
        }
    }

    /// Remove every object.
    pub fn clear(&mut self) -> bool {
        if self.document.is_empty() {
            return false;
        }
        self.history.save(&self.document);
        self.document.clear();
        self.selected = None;
        true
    }

    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        let done = self.history.undo(&mut self.document);
        self.drop_stale_selection();
        done
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        let done = self.history.redo(&mut self.document);
        self.drop_stale_selection();
        done
    }

    fn drop_stale_selection(&mut self) {
        if self.selected.is_some_and(|id| !self.document.contains(id)) {
            self.selected = None;
        }
    }

    // --- Text entry ------------------------------------------------------

    pub fn text_input(&mut self, c: char) -> bool {
        self.text_entry.insert_char(c)
    }

    pub fn text_backspace(&mut self) -> bool {
        self.text_entry.backspace()
    }

    /// Turn the pending text entry into a text object. Blank text is dropped.
    pub fn commit_text(&mut self) -> Option<ShapeId> {
        let (position, content) = self.text_entry.take()?;
        if content.trim().is_empty() {
            log::debug!("discarded empty text entry");
            return None;
        }
        let settings = &self.tool_manager.settings;
        let style = ShapeStyle {
            fill_color: None,
            ..settings.style_for(ToolKind::Text)
        };
        let text = Text::new(position, content, settings.font_size);
        let id = self.add_object(DrawObject::new(Shape::Text(text), style));
        log::debug!("committed text {id}");
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry;
    use crate::shapes::{Circle, Rectangle};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn circle_at(canvas: &mut Canvas, x: f64, y: f64, r: f64) -> ShapeId {
        canvas.add_object(DrawObject::new(
            Shape::Circle(Circle::new(Point::new(x, y), r)),
            ShapeStyle::default(),
        ))
    }

    fn drag(canvas: &mut Canvas, from: Point, to: Point) {
        canvas.pointer_down(from);
        canvas.pointer_move(to);
        canvas.pointer_up(to);
    }

    #[test]
    fn test_draw_and_undo_scenario() {
        init_logger();
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Circle);
        drag(&mut canvas, Point::new(100.0, 100.0), Point::new(130.0, 100.0));
        let a = canvas.document.objects()[0].id();

        canvas.set_tool(ToolKind::Rectangle);
        drag(&mut canvas, Point::new(200.0, 200.0), Point::new(260.0, 240.0));
        assert_eq!(canvas.document.len(), 2);

        assert!(canvas.undo());
        assert_eq!(canvas.document.len(), 1);
        assert_eq!(canvas.document.objects()[0].id(), a);

        assert!(canvas.undo());
        assert!(canvas.document.is_empty());
        assert!(!canvas.undo());

        assert!(canvas.redo());
        assert_eq!(canvas.document.len(), 1);
        assert_eq!(canvas.document.objects()[0].id(), a);
    }

    #[test]
    fn test_commit_threshold_through_pointer() {
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Rectangle);
        drag(&mut canvas, Point::new(10.0, 10.0), Point::new(12.0, 12.0));
        assert!(canvas.document.is_empty());
        assert!(!canvas.can_undo());

        drag(&mut canvas, Point::new(10.0, 10.0), Point::new(20.0, 20.0));
        assert_eq!(canvas.document.len(), 1);
        assert_eq!(canvas.history().undo_len(), 1);
    }

    #[test]
    fn test_select_drag_scenario() {
        let mut canvas = Canvas::default();
        let id = circle_at(&mut canvas, 50.0, 50.0, 20.0);
        canvas.pointer_down(Point::new(55.0, 55.0));
        assert_eq!(canvas.selected(), Some(id));
        canvas.pointer_move(Point::new(80.0, 80.0));
        canvas.pointer_up(Point::new(80.0, 80.0));

        let center = canvas.document.get(id).unwrap().shape.center();
        assert_eq!(center, Point::new(75.0, 75.0));
        // Creation plus one drag entry.
        assert_eq!(canvas.history().undo_len(), 2);

        canvas.undo();
        let center = canvas.document.get(id).unwrap().shape.center();
        assert_eq!(center, Point::new(50.0, 50.0));
        assert_eq!(canvas.selected(), Some(id));
    }

    #[test]
    fn test_click_without_move_records_nothing() {
        let mut canvas = Canvas::default();
        let id = circle_at(&mut canvas, 50.0, 50.0, 20.0);
        canvas.pointer_down(Point::new(50.0, 50.0));
        canvas.pointer_up(Point::new(50.0, 50.0));
        assert_eq!(canvas.selected(), Some(id));
        assert_eq!(canvas.history().undo_len(), 1);

        canvas.pointer_down(Point::new(400.0, 400.0));
        assert_eq!(canvas.selected(), None);
    }

    #[test]
    fn test_erase_scenario_removes_topmost_only() {
        let mut canvas = Canvas::default();
        let low = circle_at(&mut canvas, 50.0, 50.0, 20.0);
        let high = canvas.add_object(DrawObject::new(
            Shape::Rectangle(Rectangle::new(Point::new(40.0, 40.0), 20.0, 20.0)),
            ShapeStyle::default(),
        ));
        canvas.set_tool(ToolKind::Eraser);
        canvas.pointer_down(Point::new(50.0, 50.0));
        canvas.pointer_up(Point::new(50.0, 50.0));
        assert!(canvas.document.contains(low));
        assert!(!canvas.document.contains(high));
    }

    #[test]
    fn test_rotation_composition() {
        let mut canvas = Canvas::default();
        let id = circle_at(&mut canvas, 0.0, 0.0, 10.0);
        canvas.select(id);
        let original = canvas.document.get(id).unwrap().rotation;

        let rotate_by = |canvas: &mut Canvas, degrees: f64| {
            let obj = canvas.document.get(id).unwrap();
            let center = geometry::rotation_center(obj);
            let handle = geometry::rotation_handle_position(obj);
            let radius = handle.distance(center);
            let start = (handle.y - center.y).atan2(handle.x - center.x);
            let end = start + degrees.to_radians();
            let target = Point::new(center.x + radius * end.cos(), center.y + radius * end.sin());
            canvas.pointer_down(handle);
            assert!(matches!(canvas.gesture(), Gesture::Rotating { .. }));
            canvas.pointer_move(target);
            canvas.pointer_up(target);
        };

        rotate_by(&mut canvas, 30.0);
        let rotated = canvas.document.get(id).unwrap().rotation;
        assert!((rotated - original - 30.0).abs() < 1e-9);

        rotate_by(&mut canvas, -30.0);
        let restored = canvas.document.get(id).unwrap().rotation;
        assert!((restored - original).abs() < 1e-9);
        assert_eq!(canvas.history().undo_len(), 3);
    }

    #[test]
    fn test_undo_redo_inverse_for_each_operation() {
        type Op = fn(&mut Canvas, ShapeId);
        let ops: [Op; 6] = [
            |c, id| {
                c.remove_object(id);
            },
            |c, id| {
                c.update_object(id, &ObjectPatch::rotation(45.0));
            },
            |c, id| {
                c.reorder(id, ZOrder::Front);
            },
            |c, id| {
                c.duplicate(id);
            },
            |c, _| {
                c.clear();
            },
            |c, _| {
                circle_at(c, 5.0, 5.0, 5.0);
            },
        ];
        for op in ops {
            let mut canvas = Canvas::default();
            let id = circle_at(&mut canvas, 10.0, 10.0, 5.0);
            circle_at(&mut canvas, 30.0, 30.0, 5.0);
            let before = canvas.document.objects().to_vec();
            op(&mut canvas, id);
            let after = canvas.document.objects().to_vec();
            assert_ne!(before, after);

            assert!(canvas.undo());
            assert_eq!(canvas.document.objects(), before.as_slice());
            assert!(canvas.redo());
            assert_eq!(canvas.document.objects(), after.as_slice());
        }
    }

    #[test]
    fn test_cancel_restores_drag_without_history() {
        let mut canvas = Canvas::default();
        let id = circle_at(&mut canvas, 50.0, 50.0, 20.0);
        canvas.pointer_down(Point::new(50.0, 50.0));
        canvas.pointer_move(Point::new(90.0, 90.0));
        assert!(canvas.cancel());
        assert_eq!(
            canvas.document.get(id).unwrap().shape.center(),
            Point::new(50.0, 50.0)
        );
        assert_eq!(canvas.history().undo_len(), 1);
        assert!(!canvas.is_gesture_active());
        assert!(!canvas.cancel());
    }

    #[test]
    fn test_text_commit() {
        init_logger();
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Text);
        canvas.pointer_down(Point::new(10.0, 40.0));
        canvas.pointer_up(Point::new(10.0, 40.0));
        assert!(canvas.text_entry().is_active());
        for c in "hello".chars() {
            canvas.text_input(c);
        }
        let id = canvas.commit_text().unwrap();
        let obj = canvas.document.get(id).unwrap();
        let text = obj.shape.as_text().unwrap();
        assert_eq!(text.content, "hello");
        assert!((text.font_size - canvas.settings().font_size).abs() < f64::EPSILON);
        assert!(text.measured_width.is_some());
        assert_eq!(obj.style.fill_color, None);

        canvas.pointer_down(Point::new(100.0, 100.0));
        canvas.text_input(' ');
        assert!(canvas.commit_text().is_none());
        assert_eq!(canvas.document.len(), 1);
    }

    #[test]
    fn test_clicking_away_commits_pending_text() {
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Text);
        canvas.pointer_down(Point::new(10.0, 40.0));
        canvas.text_input('x');
        canvas.pointer_down(Point::new(200.0, 40.0));
        assert_eq!(canvas.document.len(), 1);
        assert!(canvas.text_entry().is_active());
    }

    #[test]
    fn test_set_tool_discards_transient_state() {
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Pen);
        canvas.pointer_down(Point::new(0.0, 0.0));
        canvas.pointer_move(Point::new(10.0, 10.0));
        assert!(canvas.preview().is_some());
        canvas.set_tool(ToolKind::Select);
        assert!(canvas.preview().is_none());
        assert!(!canvas.is_gesture_active());
        assert!(canvas.document.is_empty());
    }

    #[test]
    fn test_delete_and_duplicate_selected() {
        let mut canvas = Canvas::default();
        let id = circle_at(&mut canvas, 50.0, 50.0, 20.0);
        assert!(!canvas.delete_selected());
        canvas.select(id);
        let copy = canvas.duplicate_selected().unwrap();
        assert_eq!(canvas.selected(), Some(copy));
        assert_eq!(
            canvas.document.get(copy).unwrap().shape.center(),
            Point::new(70.0, 70.0)
        );
        assert!(canvas.delete_selected());
        assert_eq!(canvas.selected(), None);
        assert_eq!(canvas.document.len(), 1);
    }

    #[test]
    fn test_undo_clears_stale_selection() {
        let mut canvas = Canvas::default();
        let id = circle_at(&mut canvas, 50.0, 50.0, 20.0);
        canvas.select(id);
        canvas.undo();
        assert_eq!(canvas.selected(), None);
    }

    #[test]
    fn test_reorder_noop_leaves_history() {
        let mut canvas = Canvas::default();
        let id = circle_at(&mut canvas, 50.0, 50.0, 20.0);
        for direction in [ZOrder::Front, ZOrder::Forward, ZOrder::Backward, ZOrder::Back] {
            assert!(!canvas.reorder(id, direction));
        }
        assert_eq!(canvas.history().undo_len(), 1);

        let top = circle_at(&mut canvas, 60.0, 60.0, 10.0);
        assert!(!canvas.reorder(top, ZOrder::Front));
        assert!(!canvas.reorder(id, ZOrder::Back));
        assert_eq!(canvas.history().undo_len(), 2);
    }
}
