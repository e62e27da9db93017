use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::event::{ChannelEvent, EventChannel, SyncPayload, WirePhase};
use crate::notice::{SyncFailure, SyncNotice};
use crate::params::SessionParams;

/// Lifecycle of a sync session. Only moves forward; `Finished` and `Error`
/// are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Syncing,
    Finished,
    Error,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Error)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Syncing => write!(f, "syncing"),
            Self::Finished => write!(f, "finished"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Client side of one server-driven pull.
///
/// The session reads its event channel one event at a time, in arrival order,
/// and pushes a [`SyncNotice`] to every subscriber for each meaningful event.
/// On reaching a terminal phase it closes the channel (exactly once) and
/// ignores anything that might still arrive.
pub struct SyncSession {
    params: SessionParams,
    phase: Phase,
    output: Vec<String>,
    subscribers: Vec<mpsc::UnboundedSender<SyncNotice>>,
    channel: Option<Box<dyn EventChannel>>,
}

impl SyncSession {
    pub fn new(params: SessionParams) -> Self {
        Self {
            params,
            phase: Phase::Idle,
            output: Vec::new(),
            subscribers: Vec::new(),
            channel: None,
        }
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Output chunks received so far, oldest first.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn redirect_url(&self) -> String {
        self.params.redirect_url()
    }

    /// Register a subscriber. It receives every notice emitted from now on.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SyncNotice> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Hand the session the channel it should read from.
    pub fn attach(&mut self, channel: Box<dyn EventChannel>) {
        self.close();
        self.channel = Some(channel);
        if self.phase.is_terminal() {
            self.close();
        }
    }

    /// True while a channel is attached and not yet closed.
    pub fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    /// Read events until the session reaches a terminal phase or the channel
    /// is gone. A stream that ends early counts as a transport failure.
    pub async fn run(&mut self) -> Phase {
        while !self.phase.is_terminal() {
            let Some(channel) = self.channel.as_mut() else {
                break;
            };
            let event = channel
                .next_event()
                .await
                .unwrap_or_else(|| ChannelEvent::TransportError("event stream ended".into()));
            self.handle(event);
        }
        self.phase
    }

    /// Apply one inbound event. Events after a terminal phase are dropped.
    pub fn handle(&mut self, event: ChannelEvent) {
        if self.phase.is_terminal() {
            debug!(phase = %self.phase, "dropping event after terminal phase");
            return;
        }

        match event {
            ChannelEvent::Message(data) => match serde_json::from_str::<SyncPayload>(&data) {
                Ok(payload) => self.apply(payload),
                Err(e) => warn!("ignoring malformed sync message: {e}"),
            },
            ChannelEvent::TransportError(reason) => {
                warn!(repo = %self.params.repo, "sync channel failed: {reason}");
                self.enter_terminal(Phase::Error, SyncNotice::Error(SyncFailure::transport()));
            }
        }
    }

    /// Close the channel if one is open. Safe before a terminal phase and
    /// safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.close();
        }
    }

    fn apply(&mut self, payload: SyncPayload) {
        match WirePhase::parse(&payload.phase) {
            Some(WirePhase::Syncing) => {
                if self.phase == Phase::Idle {
                    debug!(repo = %self.params.repo, "sync started");
                }
                self.phase = Phase::Syncing;
                let output = payload.output.unwrap_or_default();
                if !output.is_empty() {
                    self.output.push(output.clone());
                }
                self.emit(SyncNotice::Syncing { output });
            }
            Some(WirePhase::Finished) => {
                let redirect_url = self.redirect_url();
                self.enter_terminal(Phase::Finished, SyncNotice::Finished { redirect_url });
            }
            Some(WirePhase::Error) => {
                let failure = SyncFailure {
                    message: payload.message,
                    output: payload.output,
                };
                self.enter_terminal(Phase::Error, SyncNotice::Error(failure));
            }
            None => debug!(phase = %payload.phase, "ignoring unknown sync phase"),
        }
    }

    fn enter_terminal(&mut self, phase: Phase, notice: SyncNotice) {
        debug!(repo = %self.params.repo, %phase, "sync ended");
        self.phase = phase;
        self.close();
        self.emit(notice);
    }

    fn emit(&mut self, notice: SyncNotice) {
        // Subscribers that hung up are dropped.
        self.subscribers.retain(|tx| tx.send(notice.clone()).is_ok());
    }
}
