//! chalkgrid Application
//!
//! The application shell providing windowing, input handling,
//! presentation and integration of all components.

mod app;
mod board;
mod shortcuts;

pub use app::{App, AppConfig, AppError, AppEvent};
pub use board::{Board, BoardResponse};
pub use shortcuts::{Shortcut, ShortcutAction, ShortcutRegistry};
