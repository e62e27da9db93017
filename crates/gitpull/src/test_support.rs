use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::event::{ChannelEvent, EventChannel};

/// In-memory event channel that replays a fixed script of events.
pub struct ScriptedChannel {
    events: VecDeque<ChannelEvent>,
    stall: bool,
    calls: ChannelCalls,
}

/// Counters that stay readable after the channel has moved into a session.
#[derive(Debug, Clone, Default)]
pub struct ChannelCalls {
    reads: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl ChannelCalls {
    /// Number of `next_event` calls.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `close` calls.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl ScriptedChannel {
    pub fn new(events: Vec<ChannelEvent>) -> (Self, ChannelCalls) {
        let calls = ChannelCalls::default();
        let channel = Self {
            events: events.into(),
            stall: false,
            calls: calls.clone(),
        };
        (channel, calls)
    }

    /// Replays `events`, then waits forever instead of ending the stream,
    /// like a server that stops sending without hanging up.
    pub fn stalling(events: Vec<ChannelEvent>) -> (Self, ChannelCalls) {
        let (mut channel, calls) = Self::new(events);
        channel.stall = true;
        (channel, calls)
    }
}

#[async_trait::async_trait]
impl EventChannel for ScriptedChannel {
    async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.calls.reads.fetch_add(1, Ordering::SeqCst);
        match self.events.pop_front() {
            Some(event) => Some(event),
            None if self.stall => std::future::pending().await,
            None => None,
        }
    }

    fn close(&mut self) {
        self.calls.closes.fetch_add(1, Ordering::SeqCst);
        self.stall = false;
        self.events.clear();
    }
}
