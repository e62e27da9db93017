use std::time::Duration;

use gitpull::{AnimationDriver, ProgressUpdate};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

pub const STATUS_PERIOD: Duration = Duration::from_millis(3000);
pub const ELLIPSIS_PERIOD: Duration = Duration::from_millis(800);
pub const CREEP_PERIOD: Duration = Duration::from_millis(900);

/// Rotating status lines shown while the pull runs.
pub const STATUS_MESSAGES: &[&str] = &[
    "Adding Hidden Agendas",
    "Adjusting Bell Curves",
    "Aligning Covariance Matrices",
    "Applying Feng Shui Shaders",
    "Binding Sapling Root System",
    "Breeding Fauna",
    "Building Data Trees",
    "Calibrating Blue Skies",
    "Charging Ozone Layer",
    "Coalescing Cloud Formations",
    "Collecting Meteor Particles",
    "Compressing Fish Files",
    "Computing Optimal Bin Packing",
    "Decomposing Singular Values",
    "Deciding What Message to Display Next",
    "Downloading Satellite Terrain Data",
    "Extracting Resources",
    "Flushing Pipe Network",
    "Graphing Whale Migration",
    "Reticulating Splines",
];

/// Animation driven by three repeating tokio timers: a status line rotation,
/// a trailing-dot ticker and the gauge creep.
#[derive(Default)]
pub struct IntervalAnimation {
    tasks: Vec<JoinHandle<()>>,
}

impl IntervalAnimation {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnimationDriver for IntervalAnimation {
    fn start(&mut self, updates: mpsc::UnboundedSender<ProgressUpdate>) {
        self.stop();

        let mut next_status = 0usize;
        self.tasks = vec![
            repeat(STATUS_PERIOD, updates.clone(), move || {
                let text = STATUS_MESSAGES[next_status % STATUS_MESSAGES.len()];
                next_status += 1;
                ProgressUpdate::Status(text.to_owned())
            }),
            repeat(ELLIPSIS_PERIOD, updates.clone(), || ProgressUpdate::Ellipsis),
            repeat(CREEP_PERIOD, updates, || ProgressUpdate::Creep),
        ];
    }

    fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }
}

impl Drop for IntervalAnimation {
    fn drop(&mut self) {
        self.stop();
    }
}

/// First update fires one full period after start.
fn repeat<F>(
    period: Duration,
    updates: mpsc::UnboundedSender<ProgressUpdate>,
    mut step: F,
) -> JoinHandle<()>
where
    F: FnMut() -> ProgressUpdate + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;
            if updates.send(step()).is_err() {
                break;
            }
        }
    })
}
