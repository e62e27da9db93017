use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Gauge};

use crate::app::App;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let color = if app.is_error {
        Color::Red
    } else if app.redirect_url.is_some() {
        Color::Green
    } else {
        Color::Cyan
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .ratio((app.progress / 100.0).clamp(0.0, 1.0))
        .label(app.progress_text.as_str());

    frame.render_widget(gauge, area);
}
