//! Full-size viewer drawn over the grid.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use ratatui_image::{Resize, StatefulImage};

use super::preview::PreviewStatus;
use crate::app::App;
use crate::blob;
use crate::photo::Photo;

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let (Some(index), len) = (app.gallery.viewer().index(), app.gallery.visible_len()) else {
        return;
    };

    let modal_area = centered_rect(
        area,
        area.width.saturating_sub(6).max(20),
        area.height.saturating_sub(4).max(10),
    );
    frame.render_widget(Clear, modal_area);

    let Some(photo) = app.gallery.current_photo() else {
        return;
    };
    let is_favorite = app.gallery.is_favorite(&photo.id);

    let star = if is_favorite { " ★" } else { "" };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {}{} ", photo.title, star))
        .title_bottom(Line::from(format!(" {}/{} ", index + 1, len)).right_aligned());
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[0]);

    render_details(frame, photo, panes[1]);

    // Image pane
    let image_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let image_area = image_block.inner(panes[0]);
    frame.render_widget(image_block, panes[0]);

    let blob = if blob::is_blob_url(&photo.full_url) {
        app.gallery.blob(&photo.full_url)
    } else {
        None
    };
    let full_url = photo.full_url.clone();

    match blob {
        Some(blob) => match app.preview.request(&full_url, &blob.bytes) {
            PreviewStatus::Ready(protocol) => {
                let image = StatefulImage::new(None).resize(Resize::Fit(None));
                frame.render_stateful_widget(image, image_area, protocol);
            }
            PreviewStatus::Loading => render_centered_note(frame, image_area, "Loading..."),
            PreviewStatus::Failed => render_centered_note(frame, image_area, "Could not decode image"),
            PreviewStatus::Unavailable => {
                render_centered_note(frame, image_area, "Image preview unavailable in this terminal")
            }
        },
        None => {
            let text = vec![
                Line::from(Span::styled("Image URL", Style::default().fg(Color::DarkGray))),
                Line::from(full_url),
            ];
            frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), image_area);
        }
    }

    let help = Paragraph::new("←/h:prev | →/l:next | f:favorite | Esc:close")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[1]);
}

fn render_details(frame: &mut Frame, photo: &Photo, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            photo.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(photo.caption.clone()),
        Line::from(""),
    ];

    if !photo.photographer.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("By: ", label),
            Span::raw(photo.photographer.clone()),
        ]));
    }
    if !photo.tags.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Tags: ", label),
            Span::styled(photo.tags.join(", "), Style::default().fg(Color::Green)),
        ]));
    }
    if let Some(metadata) = &photo.metadata {
        lines.push(Line::from(""));
        for (key, value) in metadata {
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", key), label),
                Span::raw(value.clone()),
            ]));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![Span::styled("Id: ", label), Span::raw(photo.id.clone())]));

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::LEFT).border_style(label));
    frame.render_widget(paragraph, area);
}

fn render_centered_note(frame: &mut Frame, area: Rect, note: &str) {
    if area.height == 0 {
        return;
    }
    let paragraph = Paragraph::new(note)
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    let y = area.y + area.height / 2;
    frame.render_widget(paragraph, Rect::new(area.x, y, area.width, 1));
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
