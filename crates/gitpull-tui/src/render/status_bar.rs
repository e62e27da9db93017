use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::App;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let hint_style = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        Span::styled(" t", hint_style),
        Span::styled(
            if app.terminal_visible {
                " hide output  "
            } else {
                " show output  "
            },
            hint_style,
        ),
    ];
    if app.terminal_visible {
        spans.push(Span::styled("\u{2191}\u{2193}", hint_style));
        spans.push(Span::styled(" scroll  ", hint_style));
    }
    spans.push(Span::styled("q", hint_style));
    spans.push(Span::styled(
        if app.is_done() { " close" } else { " cancel" },
        hint_style,
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
