//! Keyboard shortcut registry and lookup.

use inkpad_core::KeyEvent;
use inkpad_core::document::ZOrder;

/// What a shortcut does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Undo,
    Redo,
    Duplicate,
    DeleteSelected,
    Reorder(ZOrder),
    /// Abort the current gesture or text entry, or close when idle.
    Cancel,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub action: Action,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: Action,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// Letter keys match either case; Cmd counts as Ctrl.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.ctrl == event.modifiers.command()
            && self.shift == event.modifiers.shift
            && self.key.eq_ignore_ascii_case(&event.key)
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, Action::Undo, "Undo"),
            Shortcut::new("Z", true, true, Action::Redo, "Redo"),
            Shortcut::new("Y", true, false, Action::Redo, "Redo"),
            Shortcut::new("D", true, false, Action::Duplicate, "Duplicate selection"),
            Shortcut::new("Delete", false, false, Action::DeleteSelected, "Delete selection"),
            Shortcut::new("Backspace", false, false, Action::DeleteSelected, "Delete selection"),
            Shortcut::new("]", false, false, Action::Reorder(ZOrder::Forward), "Bring forward"),
            Shortcut::new("[", false, false, Action::Reorder(ZOrder::Backward), "Send backward"),
            Shortcut::new("]", true, false, Action::Reorder(ZOrder::Front), "Bring to front"),
            Shortcut::new("[", true, false, Action::Reorder(ZOrder::Back), "Send to back"),
            Shortcut::new("Escape", false, false, Action::Cancel, "Cancel or close"),
        ]
    }

    pub fn lookup(event: &KeyEvent) -> Option<Action> {
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(event))
            .map(|shortcut| shortcut.action)
    }

    /// Log all shortcuts at debug level.
    pub fn log_all() {
        for shortcut in Self::all() {
            log::debug!("{:12} {}", shortcut.format(), shortcut.description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpad_core::Modifiers;

    fn ctrl_shift() -> Modifiers {
        Modifiers {
            shift: true,
            ..Modifiers::CTRL
        }
    }

    fn lookup(key: &str, modifiers: Modifiers) -> Option<Action> {
        ShortcutRegistry::lookup(&KeyEvent::new(key, modifiers))
    }

    #[test]
    fn test_format() {
        let redo = Shortcut::new("Z", true, true, Action::Redo, "Redo");
        assert_eq!(redo.format(), "Ctrl+Shift+Z");
        assert_eq!(
            Shortcut::new("Delete", false, false, Action::DeleteSelected, "").format(),
            "Delete"
        );
    }

    #[test]
    fn test_lookup_undo_redo() {
        assert_eq!(lookup("z", Modifiers::CTRL), Some(Action::Undo));
        assert_eq!(lookup("Z", ctrl_shift()), Some(Action::Redo));
        assert_eq!(lookup("y", Modifiers::CTRL), Some(Action::Redo));

        let cmd = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(ShortcutRegistry::lookup(&KeyEvent::new("z", cmd)), Some(Action::Undo));
    }

    #[test]
    fn test_lookup_reorder() {
        assert_eq!(
            ShortcutRegistry::lookup(&KeyEvent::plain("]")),
            Some(Action::Reorder(ZOrder::Forward))
        );
        assert_eq!(
            ShortcutRegistry::lookup(&KeyEvent::new("[", Modifiers::CTRL)),
            Some(Action::Reorder(ZOrder::Back))
        );
    }

    #[test]
    fn test_plain_letters_are_not_shortcuts() {
        assert_eq!(ShortcutRegistry::lookup(&KeyEvent::plain("z")), None);
        assert_eq!(ShortcutRegistry::lookup(&KeyEvent::plain("d")), None);
        assert_eq!(ShortcutRegistry::lookup(&KeyEvent::new("Escape", Modifiers::CTRL)), None);
    }
}
