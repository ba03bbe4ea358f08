//! Tile grid for the filtered photo list.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use super::truncate;
use crate::app::App;
use crate::photo::Photo;

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let tile_width = app.config.grid.tile_width.max(10);
    let tile_height = app.config.grid.tile_height.max(4);

    // Columns follow the terminal width
    app.columns = (area.width / tile_width).max(1) as usize;
    app.visible_rows = (area.height / tile_height).max(1) as usize;
    app.ensure_visible();

    let visible = app.gallery.visible();
    if visible.is_empty() {
        let message = if app.gallery.filter().is_active() {
            "No photos match the current filters (Esc to clear)"
        } else {
            "No photos yet (a to add one)"
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center);
        let y = area.y + area.height / 2;
        frame.render_widget(empty, Rect::new(area.x, y, area.width, 1.min(area.height)));
        return;
    }

    let col_constraints: Vec<Constraint> = (0..app.columns)
        .map(|_| Constraint::Length(tile_width))
        .collect();
    let row_constraints: Vec<Constraint> = (0..app.visible_rows)
        .map(|_| Constraint::Length(tile_height))
        .collect();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(area);

    for (row_idx, row_area) in rows.iter().enumerate() {
        let actual_row = app.scroll_offset + row_idx;

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(col_constraints.clone())
            .split(*row_area);

        for (col_idx, cell_area) in cols.iter().enumerate() {
            let idx = actual_row * app.columns + col_idx;
            if let Some(photo) = visible.get(idx) {
                let is_favorite = app.gallery.is_favorite(&photo.id);
                render_tile(frame, photo, *cell_area, idx == app.selected, is_favorite);
            }
        }
    }
}

fn render_tile(frame: &mut Frame, photo: &Photo, area: Rect, is_selected: bool, is_favorite: bool) {
    let border_color = if is_selected { Color::Cyan } else { Color::DarkGray };
    let max = (area.width as usize).saturating_sub(4);

    let star = if is_favorite { "★ " } else { "" };
    let title = truncate(&format!("{}{}", star, photo.title), max);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);
    if photo.client_added {
        block = block.title_bottom(Line::from(" new ").right_aligned());
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < 2 || inner.height < 1 {
        return;
    }

    let width = inner.width as usize;
    let mut lines = vec![Line::from(Span::styled(
        truncate(&photo.caption, width),
        Style::default().fg(Color::White),
    ))];
    if !photo.photographer.is_empty() {
        lines.push(Line::from(Span::styled(
            truncate(&format!("by {}", photo.photographer), width),
            Style::default().fg(Color::Gray),
        )));
    }
    if !photo.tags.is_empty() {
        let tags = photo
            .tags
            .iter()
            .map(|t| format!("#{}", t))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(Line::from(Span::styled(
            truncate(&tags, width),
            Style::default().fg(Color::Green),
        )));
    }

    let style = if is_selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    frame.render_widget(Paragraph::new(lines).style(style), inner);
}
