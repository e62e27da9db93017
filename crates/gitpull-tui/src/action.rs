use gitpull::{ProgressUpdate, SyncNotice};

/// Commands returned by the app to the event loop for side-effect execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// No side effect needed.
    None,
    /// Leave the view.
    Quit,
    /// Cancel the cosmetic timers; the view stays open.
    StopAnimation,
    /// The pull finished: stop the timers and leave towards `redirect_url`.
    Finish { redirect_url: String },
}

/// Inputs pushed into the app from the session and the animation driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Notice(SyncNotice),
    Progress(ProgressUpdate),
}
