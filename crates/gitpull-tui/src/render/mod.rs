mod gauge;
mod remediation;
mod status_bar;
mod terminal_pane;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.area();

    // Title bar (1), gauge (3), body, bottom bar (1).
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(size);

    render_title_bar(frame, outer[0], app);
    gauge::render(frame, outer[1], app);

    match (app.remediation(), app.terminal_visible) {
        (Some(lines), true) => {
            let body = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(lines.len() as u16 + 2),
                    Constraint::Min(3),
                ])
                .split(outer[2]);
            remediation::render(frame, body[0], &lines);
            terminal_pane::render(frame, body[1], app);
        }
        (Some(lines), false) => remediation::render(frame, outer[2], &lines),
        (None, true) => terminal_pane::render(frame, outer[2], app),
        (None, false) => {}
    }

    status_bar::render(frame, outer[3], app);
}

fn render_title_bar(frame: &mut Frame, area: Rect, app: &App) {
    let title_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let label_style = Style::default().fg(Color::DarkGray);

    let line = Line::from(vec![
        Span::styled(" Syncing", title_style),
        Span::raw("  "),
        Span::styled(format!("[{}]", app.repo), label_style),
        Span::raw(" "),
        Span::styled(format!("-> {}", app.target_path), label_style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
