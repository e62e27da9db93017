pub mod action;
pub mod animation;
pub mod app;
mod render;

use crossterm::ExecutableCommand;
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use gitpull::{AnimationDriver, SyncNotice};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tracing::debug;

use crate::action::{Action, AppCommand};
use crate::app::App;

pub use animation::IntervalAnimation;
pub use app::Outcome;

/// What the view shows and where its inputs come from.
pub struct SyncView {
    pub repo: String,
    pub target_path: String,
    /// Notices from the running session.
    pub notices: mpsc::UnboundedReceiver<SyncNotice>,
    pub animation: Box<dyn AnimationDriver>,
}

/// Show the sync view until the pull finishes or the user quits.
///
/// Returns as soon as a `finished` notice arrives. After an error the view
/// stays up so the output can be read, and returns on `q`.
pub async fn run(view: SyncView) -> anyhow::Result<Outcome> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(&mut terminal, view).await;

    // Terminal teardown (always runs).
    disable_raw_mode()?;
    std::io::stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    view: SyncView,
) -> anyhow::Result<Outcome> {
    use futures::StreamExt;

    let SyncView {
        repo,
        target_path,
        mut notices,
        mut animation,
    } = view;

    let mut app = App::new(repo, target_path);
    let mut event_stream = EventStream::new();
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
    animation.start(progress_tx);

    loop {
        terminal.draw(|frame| render::render(frame, &app))?;

        let command = tokio::select! {
            Some(event_result) = event_stream.next() => {
                match event_result {
                    Ok(event) => {
                        match &event {
                            Event::Key(key) if key.kind != KeyEventKind::Press => continue,
                            Event::Key(_) => {}
                            _ => continue,
                        }
                        app.handle_event(event)
                    }
                    Err(_) => continue,
                }
            }
            Some(notice) = notices.recv() => {
                app.handle_action(Action::Notice(notice))
            }
            Some(update) = progress_rx.recv() => {
                app.handle_action(Action::Progress(update))
            }
            else => break,
        };

        match command {
            AppCommand::None => {}
            AppCommand::Quit => break,
            AppCommand::StopAnimation => animation.stop(),
            AppCommand::Finish { redirect_url } => {
                debug!(%redirect_url, "sync finished");
                animation.stop();
                // One last frame with the full gauge.
                terminal.draw(|frame| render::render(frame, &app))?;
                break;
            }
        }
    }

    animation.stop();
    Ok(app.outcome())
}
