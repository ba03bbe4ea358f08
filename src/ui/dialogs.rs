use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

pub fn render_help(frame: &mut Frame, area: Rect) {
    let dialog_width = 56.min(area.width.saturating_sub(4));
    let dialog_height = 26.min(area.height.saturating_sub(2));

    let x = area.x + (area.width.saturating_sub(dialog_width)) / 2;
    let y = area.y + (area.height.saturating_sub(dialog_height)) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan),
        ))
    };

    let help_text = vec![
        heading("Grid"),
        Line::from("  h/j/k/l, arrows  Move selection"),
        Line::from("  g/G              First / last photo"),
        Line::from("  PgUp/PgDn        Page up / down"),
        Line::from("  Enter            Open viewer"),
        Line::from("  f                Toggle favorite"),
        Line::from("  F                Favorites only"),
        Line::from("  a                Add image (URL or file)"),
        Line::from("  d                Remove an added image"),
        Line::from("  r / Esc          Clear all filters"),
        Line::from(""),
        heading("Filters"),
        Line::from("  /                Search (Enter/Esc to leave)"),
        Line::from("  t                Tag chips: ←/→ move, Space toggle,"),
        Line::from("                   c clear, Esc leave"),
        Line::from(""),
        heading("Viewer"),
        Line::from("  ←/h  →/l         Previous / next"),
        Line::from("  f                Toggle favorite"),
        Line::from("  Esc/q            Close"),
        Line::from(""),
        Line::from("  ?                Toggle this help"),
        Line::from("  q / Ctrl+C       Quit"),
    ];

    let paragraph = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Help "),
    );

    frame.render_widget(paragraph, dialog_area);
}
