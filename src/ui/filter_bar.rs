//! Search box and tag chips above the grid.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, AppMode};

pub fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.mode == AppMode::Searching;
    let border = if focused { Color::Cyan } else { Color::DarkGray };

    let mut spans = vec![Span::styled("/ ", Style::default().fg(Color::DarkGray))];
    if focused {
        let (before, after) = app.search.split_at_cursor();
        spans.push(Span::raw(before.to_string()));
        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(after.to_string()));
    } else if app.search.is_empty() {
        spans.push(Span::styled(
            "Search titles, captions, people, tags...",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ));
    } else {
        spans.push(Span::raw(app.search.value().to_string()));
    }

    let filter = app.gallery.filter();
    let favorites = if filter.favorites_only {
        Span::styled(" ★ favorites only ", Style::default().fg(Color::Black).bg(Color::Yellow))
    } else {
        Span::styled(" ☆ all ", Style::default().fg(Color::DarkGray))
    };

    let title = Line::from(vec![Span::raw(" Search "), favorites]);
    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title)
            .title_bottom(Line::from(format!(" {} ", app.count_label())).right_aligned()),
    );
    frame.render_widget(paragraph, area);
}

pub fn render_tags(frame: &mut Frame, app: &App, area: Rect) {
    let tags = app.gallery.all_tags();
    let focused = app.mode == AppMode::TagPicking;
    let selected_tags = &app.gallery.filter().selected_tags;

    let mut spans = vec![Span::styled(
        " Tags: ",
        Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }),
    )];

    // Keep the focused chip on screen by dropping chips from the left
    let mut start = 0;
    if focused {
        let mut width: usize = tags.iter().take(app.tag_cursor + 1).map(|t| t.chars().count() + 3).sum();
        while width > area.width.saturating_sub(8) as usize && start < app.tag_cursor {
            width -= tags[start].chars().count() + 3;
            start += 1;
        }
    }
    if start > 0 {
        spans.push(Span::styled("< ", Style::default().fg(Color::DarkGray)));
    }

    for (i, tag) in tags.iter().enumerate().skip(start) {
        let is_selected = selected_tags.contains(tag);
        let mut style = if is_selected {
            Style::default().fg(Color::Black).bg(Color::Green)
        } else {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        };
        if focused && i == app.tag_cursor {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        spans.push(Span::styled(format!(" {} ", tag), style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
