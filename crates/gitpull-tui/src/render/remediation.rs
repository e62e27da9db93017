use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

pub fn render(frame: &mut Frame, area: Rect, lines: &[String]) {
    let header_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let body_style = Style::default().fg(Color::Gray);

    let text: Vec<Line> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let style = if i == 0 { header_style } else { body_style };
            Line::from(Span::styled(line.as_str(), style))
        })
        .collect();

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" What now? "))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
