//! Tool selection for the drawing surface.

use serde::{Deserialize, Serialize};

/// Available tools.
///
/// Exactly one tool is active at a time. It only changes through an
/// explicit [`ToolManager::set_tool`] call, never as a side effect of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    /// Paint ink segments between consecutive pointer positions.
    #[default]
    Draw,
    /// Reveal the background grid under a disk around the pointer.
    Erase,
}

impl ToolKind {
    /// All tools, in toolbar order.
    pub const ALL: [ToolKind; 2] = [ToolKind::Draw, ToolKind::Erase];

    /// Get display name for this tool.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Draw => "Draw",
            ToolKind::Erase => "Erase",
        }
    }

    /// Hint shown while the tool is active.
    pub fn hint(self) -> &'static str {
        match self {
            ToolKind::Draw => "Click and drag to draw",
            ToolKind::Erase => "Click and drag to erase",
        }
    }

    /// Shortcut letter that selects this tool.
    pub fn shortcut(self) -> char {
        match self {
            ToolKind::Draw => 'd',
            ToolKind::Erase => 'e',
        }
    }

    /// Look up a tool by its shortcut letter (case-insensitive).
    pub fn from_shortcut(key: char) -> Option<Self> {
        let key = key.to_ascii_lowercase();
        Self::ALL.into_iter().find(|tool| tool.shortcut() == key)
    }
}

/// Owns the active tool.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    current_tool: ToolKind,
}

impl ToolManager {
    /// Create a new tool manager with the draw tool selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected tool.
    pub fn current_tool(&self) -> ToolKind {
        self.current_tool
    }

    /// Select a tool. Returns `true` if the selection changed.
    pub fn set_tool(&mut self, tool: ToolKind) -> bool {
        if self.current_tool == tool {
            return false;
        }
        log::info!("Tool changed: {} -> {}", self.current_tool.name(), tool.name());
        self.current_tool = tool;
        true
    }
}
