use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::App;

/// Streamed pull output, pinned to the bottom unless scrolled back.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Output ")
        .title_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);

    let lines: Vec<&str> = app.terminal.lines().collect();
    let height = inner.height as usize;
    let bottom = lines.len().saturating_sub(app.terminal_scroll as usize);
    let top = bottom.saturating_sub(height);

    let text = lines[top..bottom].join("\n");
    let paragraph = Paragraph::new(text).block(block);
    frame.render_widget(paragraph, area);
}
