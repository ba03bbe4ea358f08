pub mod add_dialog;
mod dialogs;
mod filter_bar;
mod grid;
mod modal;
pub mod preview;
mod status_bar;
pub mod text_input;

use ratatui::prelude::*;

use crate::app::{App, AppMode};

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search box
            Constraint::Length(1), // Tag chips
            Constraint::Min(0),    // Grid
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    filter_bar::render_search(frame, app, chunks[0]);
    filter_bar::render_tags(frame, app, chunks[1]);
    grid::render(frame, app, chunks[2]);
    status_bar::render(frame, app, chunks[3]);

    match app.mode {
        AppMode::Viewing => modal::render(frame, app, area),
        AppMode::Adding => {
            if let Some(ref dialog) = app.add_dialog {
                add_dialog::render(frame, dialog, area);
            }
        }
        AppMode::Help => dialogs::render_help(frame, area),
        _ => {}
    }
}

/// Shorten `text` to at most `max` characters, marking the cut.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let kept: String = text.chars().take(max - 3).collect();
    format!("{}...", kept)
}
