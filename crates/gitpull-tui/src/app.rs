use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use gitpull::{ProgressUpdate, SyncFailure, SyncNotice};

use crate::action::{Action, AppCommand};

/// Gauge label before the first status message arrives.
pub const INITIAL_TEXT: &str = "Starting sync";

/// Gauge label once the pull has finished.
pub const FINISHED_TEXT: &str = "Sync finished, redirecting...";

/// How the view was left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Finished { redirect_url: String },
    Failed(SyncFailure),
    /// The user quit before the pull reached a terminal phase.
    Cancelled,
}

/// State of the sync view. This is a pure state machine: key events and
/// actions update state and produce commands for the event loop.
pub struct App {
    /// Repository being pulled, shown in the title bar.
    pub repo: String,
    /// Folder the pull writes into; named in merge-conflict remediation.
    pub target_path: String,

    /// Gauge value, 0 to 100.
    pub progress: f64,
    pub progress_text: String,
    pub is_error: bool,

    pub terminal_visible: bool,
    /// Everything written to the terminal pane so far.
    pub terminal: String,
    /// Lines scrolled up from the bottom of the terminal pane.
    pub terminal_scroll: u16,
    /// A `\r` was the last thing written; the next character rewinds the line.
    pending_cr: bool,

    pub failure: Option<SyncFailure>,
    pub redirect_url: Option<String>,
}

impl App {
    pub fn new(repo: impl Into<String>, target_path: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            target_path: target_path.into(),
            progress: 0.0,
            progress_text: INITIAL_TEXT.to_owned(),
            is_error: false,
            terminal_visible: false,
            terminal: String::new(),
            terminal_scroll: 0,
            pending_cr: false,
            failure: None,
            redirect_url: None,
        }
    }

    /// True once a `finished` or `error` notice has been applied.
    pub fn is_done(&self) -> bool {
        self.failure.is_some() || self.redirect_url.is_some()
    }

    pub fn outcome(&self) -> Outcome {
        if let Some(redirect_url) = &self.redirect_url {
            Outcome::Finished {
                redirect_url: redirect_url.clone(),
            }
        } else if let Some(failure) = &self.failure {
            Outcome::Failed(failure.clone())
        } else {
            Outcome::Cancelled
        }
    }

    /// Remediation lines for the current failure, if it has any.
    pub fn remediation(&self) -> Option<Vec<String>> {
        self.failure
            .as_ref()
            .and_then(|f| f.remediation(&self.target_path))
    }

    /// Handle a terminal event, returning a command for the event loop.
    pub fn handle_event(&mut self, event: Event) -> AppCommand {
        match event {
            Event::Key(key) => self.handle_key(key),
            _ => AppCommand::None,
        }
    }

    /// Handle a session notice or an animation step.
    pub fn handle_action(&mut self, action: Action) -> AppCommand {
        match action {
            Action::Notice(notice) => self.handle_notice(notice),
            Action::Progress(update) => {
                self.apply_progress(update);
                AppCommand::None
            }
        }
    }

    fn handle_notice(&mut self, notice: SyncNotice) -> AppCommand {
        if self.is_done() {
            return AppCommand::None;
        }

        match notice {
            SyncNotice::Syncing { output } => {
                self.write_terminal(&output);
                AppCommand::None
            }
            SyncNotice::Finished { redirect_url } => {
                self.progress = 100.0;
                self.progress_text = FINISHED_TEXT.to_owned();
                self.redirect_url = Some(redirect_url.clone());
                AppCommand::Finish { redirect_url }
            }
            SyncNotice::Error(failure) => {
                self.progress = 100.0;
                self.progress_text = failure.headline();
                self.is_error = true;
                self.terminal_visible = true;
                self.terminal_scroll = 0;
                if let Some(output) = &failure.output {
                    self.write_terminal(output);
                }
                self.failure = Some(failure);
                AppCommand::StopAnimation
            }
        }
    }

    /// Append pull output the way a terminal shows it: a `\r` outside of
    /// `\r\n` returns to the start of the line, so progress counters
    /// overwrite themselves. The `\r` may end one chunk and its line the next.
    fn write_terminal(&mut self, output: &str) {
        for c in output.chars() {
            match c {
                '\r' => self.pending_cr = true,
                '\n' => {
                    self.pending_cr = false;
                    self.terminal.push('\n');
                }
                c => {
                    if std::mem::take(&mut self.pending_cr) {
                        let line_start = self.terminal.rfind('\n').map_or(0, |i| i + 1);
                        self.terminal.truncate(line_start);
                    }
                    self.terminal.push(c);
                }
            }
        }
    }

    /// Scrolling stops once the first line reaches the bottom of the pane.
    fn max_scroll(&self) -> u16 {
        let lines = self.terminal.lines().count().saturating_sub(1);
        u16::try_from(lines).unwrap_or(u16::MAX)
    }

    fn apply_progress(&mut self, update: ProgressUpdate) {
        // Timers may still deliver a step queued before they were stopped.
        if self.is_done() {
            return;
        }

        match update {
            ProgressUpdate::Status(text) => self.progress_text = text,
            ProgressUpdate::Ellipsis => self.progress_text.push('.'),
            ProgressUpdate::Creep => self.progress += 0.01 * (100.0 - self.progress),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> AppCommand {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppCommand::Quit;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => AppCommand::Quit,
            KeyCode::Char('t') => {
                self.terminal_visible = !self.terminal_visible;
                AppCommand::None
            }
            KeyCode::Char('k') | KeyCode::Up if self.terminal_visible => {
                let max = self.max_scroll();
                self.terminal_scroll = self.terminal_scroll.saturating_add(1).min(max);
                AppCommand::None
            }
            KeyCode::Char('j') | KeyCode::Down if self.terminal_visible => {
                self.terminal_scroll = self.terminal_scroll.saturating_sub(1);
                AppCommand::None
            }
            _ => AppCommand::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

    use super::*;

    fn key_event(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn ctrl_key_event(c: char) -> Event {
        Event::Key(KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn app() -> App {
        App::new("https://github.com/acme/content", "content")
    }

    fn notice(notice: SyncNotice) -> Action {
        Action::Notice(notice)
    }

    // --- Initial state ---

    #[test]
    fn starts_empty_with_terminal_hidden() {
        let app = app();
        assert_eq!(app.progress, 0.0);
        assert_eq!(app.progress_text, INITIAL_TEXT);
        assert!(!app.terminal_visible);
        assert!(!app.is_done());
        assert_eq!(app.outcome(), Outcome::Cancelled);
    }

    // --- Notices ---

    #[test]
    fn syncing_output_is_written_to_terminal() {
        let mut app = app();
        app.handle_action(notice(SyncNotice::Syncing { output: "Fetching\n".into() }));
        app.handle_action(notice(SyncNotice::Syncing { output: String::new() }));
        app.handle_action(notice(SyncNotice::Syncing { output: "Done\n".into() }));

        assert_eq!(app.terminal, "Fetching\nDone\n");
        assert!(!app.terminal_visible);
    }

    #[test]
    fn carriage_return_overwrites_progress_line() {
        let mut app = app();
        app.handle_action(notice(SyncNotice::Syncing { output: "a 10%\r".into() }));
        app.handle_action(notice(SyncNotice::Syncing { output: "a 100%\n".into() }));

        assert_eq!(app.terminal, "a 100%\n");
    }

    #[test]
    fn git_progress_keeps_earlier_lines() {
        let mut app = app();
        for output in [
            "Cloning into 'content'...\n",
            "Receiving objects:  50% (1/2)\rReceiving objects: 100% (2/2)\r",
            "\nResolving deltas: 100% (1/1), done.\r\n",
            "Already up to date.\n",
        ] {
            app.handle_action(notice(SyncNotice::Syncing { output: output.into() }));
        }

        assert_eq!(
            app.terminal,
            "Cloning into 'content'...\n\
             Receiving objects: 100% (2/2)\n\
             Resolving deltas: 100% (1/1), done.\n\
             Already up to date.\n"
        );
    }

    #[test]
    fn error_output_after_progress_line_overwrites_it() {
        let mut app = app();
        app.handle_action(notice(SyncNotice::Syncing { output: "Counting: 3%\r".into() }));

        let failure = SyncFailure::reported("boom", Some("fatal: early EOF\n".into()));
        app.handle_action(notice(SyncNotice::Error(failure)));

        assert_eq!(app.terminal, "fatal: early EOF\n");
    }

    #[test]
    fn finished_fills_gauge_and_finishes() {
        let mut app = app();
        let command = app.handle_action(notice(SyncNotice::Finished {
            redirect_url: "/user/alice/lab".into(),
        }));

        assert_eq!(
            command,
            AppCommand::Finish {
                redirect_url: "/user/alice/lab".into()
            }
        );
        assert_eq!(app.progress, 100.0);
        assert_eq!(app.progress_text, FINISHED_TEXT);
        assert!(!app.is_error);
        assert_eq!(
            app.outcome(),
            Outcome::Finished {
                redirect_url: "/user/alice/lab".into()
            }
        );
    }

    #[test]
    fn error_shows_message_and_forces_terminal_open() {
        let mut app = app();
        app.handle_action(notice(SyncNotice::Syncing { output: "Fetching\n".into() }));

        let failure = SyncFailure::reported("boom", Some("Traceback\n".into()));
        let command = app.handle_action(notice(SyncNotice::Error(failure.clone())));

        assert_eq!(command, AppCommand::StopAnimation);
        assert_eq!(app.progress, 100.0);
        assert_eq!(app.progress_text, "Error: boom");
        assert!(app.is_error);
        assert!(app.terminal_visible);
        assert_eq!(app.terminal, "Fetching\nTraceback\n");
        assert_eq!(app.outcome(), Outcome::Failed(failure));
    }

    #[test]
    fn merge_error_has_remediation() {
        let mut app = app();
        app.handle_action(notice(SyncNotice::Error(SyncFailure::reported(
            "merge conflict",
            None,
        ))));

        let lines = app.remediation().unwrap();
        assert!(lines.iter().any(|l| l.contains("content_YYYY-MM-DD_HH:MM:SS")));
    }

    #[test]
    fn generic_error_has_no_remediation() {
        let mut app = app();
        app.handle_action(notice(SyncNotice::Error(SyncFailure::transport())));
        assert!(app.remediation().is_none());
        assert_eq!(app.progress_text, "Error: lost connection to the server");
    }

    #[test]
    fn notices_after_terminal_are_ignored() {
        let mut app = app();
        app.handle_action(notice(SyncNotice::Finished { redirect_url: "/".into() }));

        let command = app.handle_action(notice(SyncNotice::Error(SyncFailure::transport())));

        assert_eq!(command, AppCommand::None);
        assert!(!app.is_error);
        assert!(app.failure.is_none());
    }

    // --- Animation ---

    #[test]
    fn progress_updates_animate_gauge() {
        let mut app = app();

        app.handle_action(Action::Progress(ProgressUpdate::Status("Breeding Fauna".into())));
        app.handle_action(Action::Progress(ProgressUpdate::Ellipsis));
        app.handle_action(Action::Progress(ProgressUpdate::Ellipsis));
        app.handle_action(Action::Progress(ProgressUpdate::Creep));
        app.handle_action(Action::Progress(ProgressUpdate::Creep));

        assert_eq!(app.progress_text, "Breeding Fauna..");
        assert!((app.progress - 1.99).abs() < 1e-9);
    }

    #[test]
    fn creep_never_reaches_full() {
        let mut app = app();
        for _ in 0..1000 {
            app.handle_action(Action::Progress(ProgressUpdate::Creep));
        }
        assert!(app.progress < 100.0);
        assert!(app.progress > 99.0);
    }

    #[test]
    fn progress_after_error_is_ignored() {
        let mut app = app();
        app.handle_action(notice(SyncNotice::Error(SyncFailure::reported("boom", None))));

        app.handle_action(Action::Progress(ProgressUpdate::Ellipsis));
        app.handle_action(Action::Progress(ProgressUpdate::Creep));

        assert_eq!(app.progress_text, "Error: boom");
        assert_eq!(app.progress, 100.0);
    }

    // --- Keys ---

    #[test]
    fn t_toggles_terminal() {
        let mut app = app();
        app.handle_event(key_event(KeyCode::Char('t')));
        assert!(app.terminal_visible);
        app.handle_event(key_event(KeyCode::Char('t')));
        assert!(!app.terminal_visible);
    }

    #[test]
    fn q_esc_and_ctrl_c_quit() {
        let mut app = app();
        assert_eq!(app.handle_event(key_event(KeyCode::Char('q'))), AppCommand::Quit);
        assert_eq!(app.handle_event(key_event(KeyCode::Esc)), AppCommand::Quit);
        assert_eq!(app.handle_event(ctrl_key_event('c')), AppCommand::Quit);
    }

    #[test]
    fn scrolling_only_with_terminal_visible() {
        let mut app = app();
        app.handle_action(notice(SyncNotice::Syncing { output: "1\n2\n3\n".into() }));
        app.handle_event(key_event(KeyCode::Char('k')));
        assert_eq!(app.terminal_scroll, 0);

        app.handle_event(key_event(KeyCode::Char('t')));
        app.handle_event(key_event(KeyCode::Char('k')));
        app.handle_event(key_event(KeyCode::Up));
        assert_eq!(app.terminal_scroll, 2);

        app.handle_event(key_event(KeyCode::Char('j')));
        app.handle_event(key_event(KeyCode::Down));
        app.handle_event(key_event(KeyCode::Down));
        assert_eq!(app.terminal_scroll, 0);
    }

    #[test]
    fn scrolling_stops_at_first_line() {
        let mut app = app();
        app.handle_action(notice(SyncNotice::Syncing { output: "1\n2\n3\n".into() }));
        app.handle_event(key_event(KeyCode::Char('t')));

        for _ in 0..10 {
            app.handle_event(key_event(KeyCode::Char('k')));
        }
        assert_eq!(app.terminal_scroll, 2);

        app.handle_event(key_event(KeyCode::Char('j')));
        assert_eq!(app.terminal_scroll, 1);
    }

    #[test]
    fn scrolling_empty_terminal_stays_at_bottom() {
        let mut app = app();
        app.handle_event(key_event(KeyCode::Char('t')));
        app.handle_event(key_event(KeyCode::Up));
        assert_eq!(app.terminal_scroll, 0);
    }
}
