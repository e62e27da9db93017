//! Cosmetic progress animation.
//!
//! None of this affects the outcome of a sync. Drivers push
//! [`ProgressUpdate`]s while running and must push nothing once stopped.

use tokio::sync::mpsc;

/// One cosmetic step for the progress display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressUpdate {
    /// Replace the status text.
    Status(String),
    /// Append a dot to the status text.
    Ellipsis,
    /// Move the bar 1% of the remaining distance towards 100.
    Creep,
}

/// Source of cosmetic progress updates.
pub trait AnimationDriver: Send {
    /// Begin sending updates to `updates`. Restarting replaces the old sink.
    fn start(&mut self, updates: mpsc::UnboundedSender<ProgressUpdate>);

    /// Cancel every pending update. Idempotent.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// A driver that never animates; used in tests and plain output mode.
#[derive(Debug, Default)]
pub struct NoAnimation {
    running: bool,
}

impl AnimationDriver for NoAnimation {
    fn start(&mut self, _updates: mpsc::UnboundedSender<ProgressUpdate>) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
