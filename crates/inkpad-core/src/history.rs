//! Linear undo/redo over full document snapshots.

use crate::document::Document;
use crate::shapes::DrawObject;

/// Default number of undo states to keep.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

type Snapshot = Vec<DrawObject>;

/// Undo and redo stacks of object arrays.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Create empty history keeping at most `limit` undo states.
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the state about to be mutated (call before making changes).
    pub fn save(&mut self, document: &Document) {
        self.push_snapshot(document.snapshot());
    }

    /// Record a snapshot taken earlier, e.g. at the start of a gesture.
    pub fn push_snapshot(&mut self, snapshot: Vec<DrawObject>) {
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();
        if self.undo_stack.len() > self.limit {
            self.undo_stack.remove(0);
        }
    }

    /// Restore the previous state. Returns false if there was nothing to undo.
    pub fn undo(&mut self, document: &mut Document) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(document.snapshot());
        document.restore(snapshot);
        log::debug!("undo ({} left)", self.undo_stack.len());
        true
    }

    /// Re-apply the last undone state. Returns false if there was nothing to redo.
    pub fn redo(&mut self, document: &mut Document) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(document.snapshot());
        document.restore(snapshot);
        log::debug!("redo ({} left)", self.redo_stack.len());
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
