use ratatui::{prelude::*, widgets::Paragraph};

use crate::app::{App, AppMode};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mode = match app.mode {
        AppMode::Browse => "GRID",
        AppMode::Searching => "SEARCH",
        AppMode::TagPicking => "TAGS",
        AppMode::Viewing => "VIEW",
        AppMode::Adding => "ADD",
        AppMode::Help => "HELP",
    };

    let mut spans = vec![Span::styled(
        format!(" {} ", mode),
        Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    if let Some(ref message) = app.status_message {
        spans.push(Span::styled(
            format!(" {} ", message),
            Style::default().fg(Color::Yellow).bg(Color::DarkGray),
        ));
    } else {
        let position = match app.gallery.visible_len() {
            0 => "0/0".to_string(),
            len => format!("{}/{}", app.selected + 1, len),
        };
        let favorites = app.gallery.favorites().len();
        spans.push(Span::styled(
            format!(" {} | {} favorites ", position, favorites),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ));
    }

    let hint = match app.mode {
        AppMode::Browse => " /:search t:tags f:fav F:favs only a:add ?:help q:quit",
        AppMode::Searching => " type to filter | Enter/Esc:done | Ctrl+U:clear",
        AppMode::TagPicking => " ←/→:move | Space:toggle | c:clear | Esc:done",
        _ => "",
    };
    spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
