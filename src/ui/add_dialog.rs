//! Dialog for adding an image by URL or from a local file.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::text_input::TextInput;
use crate::add_image::{expand_home, AddImageSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddMode {
    #[default]
    Url,
    File,
}

impl AddMode {
    pub fn toggle(&self) -> Self {
        match self {
            AddMode::Url => AddMode::File,
            AddMode::File => AddMode::Url,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AddMode::Url => "Image URL",
            AddMode::File => "Image file",
        }
    }
}

/// Each mode keeps its own input so switching back and forth loses nothing.
#[derive(Debug, Default)]
pub struct AddDialog {
    pub mode: AddMode,
    pub url: TextInput,
    pub file: TextInput,
    /// Inline error from the last submit
    pub error: Option<String>,
}

impl AddDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &TextInput {
        match self.mode {
            AddMode::Url => &self.url,
            AddMode::File => &self.file,
        }
    }

    pub fn input_mut(&mut self) -> &mut TextInput {
        match self.mode {
            AddMode::Url => &mut self.url,
            AddMode::File => &mut self.file,
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggle();
        self.error = None;
    }

    pub fn source(&self) -> AddImageSource {
        match self.mode {
            AddMode::Url => AddImageSource::Url(self.url.value().to_string()),
            AddMode::File => AddImageSource::File(expand_home(self.file.value())),
        }
    }
}

pub fn render(frame: &mut Frame, dialog: &AddDialog, area: Rect) {
    let dialog_width = 70.min(area.width.saturating_sub(4));
    let dialog_height = 11.min(area.height.saturating_sub(2));

    let x = area.x + (area.width.saturating_sub(dialog_width)) / 2;
    let y = area.y + (area.height.saturating_sub(dialog_height)) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Add Image ");
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Mode tabs
            Constraint::Length(3), // Input
            Constraint::Min(1),    // Error / hint
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let tab = |mode: AddMode| {
        let style = if dialog.mode == mode {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(format!(" {} ", mode.label()), style)
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![tab(AddMode::Url), Span::raw(" "), tab(AddMode::File)])),
        chunks[0],
    );

    let (before, after) = dialog.input().split_at_cursor();
    let input_line = if dialog.input().is_empty() {
        let placeholder = match dialog.mode {
            AddMode::Url => "https://example.com/photo.jpg",
            AddMode::File => "~/Pictures/photo.png",
        };
        Line::from(vec![
            Span::raw("> "),
            Span::styled("_", Style::default().fg(Color::Yellow)),
            Span::styled(placeholder, Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)),
        ])
    } else {
        Line::from(vec![
            Span::raw("> "),
            Span::raw(before.to_string()),
            Span::styled("_", Style::default().fg(Color::Yellow)),
            Span::raw(after.to_string()),
        ])
    };
    let input = Paragraph::new(input_line)
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", dialog.mode.label())));
    frame.render_widget(input, chunks[1]);

    let message = match &dialog.error {
        Some(error) => Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red)),
        None => Paragraph::new("Added images are tagged so they can be filtered, and are kept for this session only.")
            .style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(message.wrap(Wrap { trim: true }), chunks[2]);

    let help = Paragraph::new("Enter:add | Tab:URL/file | Esc:cancel")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[3]);
}
