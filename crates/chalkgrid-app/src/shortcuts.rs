//! Keyboard shortcut registry and documentation.

use chalkgrid_core::ToolKind;

/// What a key press does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    SelectTool(ToolKind),
    /// Start typing into the question input.
    EditQuestion,
    /// Send the question input to the collector.
    SubmitQuestion,
    /// Stop typing without sending.
    LeaveQuestion,
    /// Delete the last typed character.
    DeleteChar,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    /// Only active while the question input has focus.
    pub while_editing: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        while_editing: bool,
        action: ShortcutAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            while_editing,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Enter (question)").
    pub fn format(&self) -> String {
        if self.while_editing {
            format!("{} (question)", self.key)
        } else {
            self.key.to_string()
        }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("D", false, ShortcutAction::SelectTool(ToolKind::Draw), "Draw tool"),
            Shortcut::new("E", false, ShortcutAction::SelectTool(ToolKind::Erase), "Erase tool"),
            Shortcut::new("Q", false, ShortcutAction::EditQuestion, "Type a new question"),
            Shortcut::new("Enter", true, ShortcutAction::SubmitQuestion, "Send the question"),
            Shortcut::new("Escape", true, ShortcutAction::LeaveQuestion, "Stop typing"),
            Shortcut::new("Backspace", true, ShortcutAction::DeleteChar, "Delete last character"),
        ]
    }

    /// Find the shortcut bound to a key name in the given input mode.
    pub fn lookup(key: &str, editing: bool) -> Option<ShortcutAction> {
        Self::all()
            .into_iter()
            .find(|s| s.while_editing == editing && s.key.eq_ignore_ascii_case(key))
            .map(|s| s.action)
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}
