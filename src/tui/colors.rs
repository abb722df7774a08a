//! Color constants for the terminal user interface.

use ratatui::style::Color;

// Accent palette for the task list and the AI panel.

/// Completed tasks.
pub const DONE_GREEN: Color = Color::Rgb(0, 140, 60);
/// AI suggestion panel border and highlights.
pub const AI_PURPLE: Color = Color::Rgb(146, 86, 214);
/// Error messages.
pub const ERROR_RED: Color = Color::Rgb(200, 40, 40);
/// Generated subtask markers in the list.
pub const SUBTASK_GOLD: Color = Color::Rgb(255, 215, 0);
