use serde::Deserialize;

/// Something that arrived on the sync event channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The `data` field of a `message` event, still JSON-encoded.
    Message(String),
    /// The transport failed. The reason is for logs only; the session treats
    /// this as an error without a message.
    TransportError(String),
}

/// Errors raised while opening an event channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server returned HTTP {0}")]
    Status(u16),

    #[error("unexpected content type: {0}")]
    ContentType(String),
}

/// A one-way stream of server-sent events.
#[async_trait::async_trait]
pub trait EventChannel: Send {
    /// Next event in arrival order, or `None` once the stream has ended.
    async fn next_event(&mut self) -> Option<ChannelEvent>;

    /// Stop receiving. Calling it more than once is harmless.
    fn close(&mut self);
}

/// JSON body of a sync message: `{"phase": .., "output": .., "message": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncPayload {
    pub phase: String,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Phases the session understands. Anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WirePhase {
    Syncing,
    Finished,
    Error,
}

impl WirePhase {
    /// Case-insensitive; older servers sent `Syncing` and `Finished`.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("syncing") {
            Some(Self::Syncing)
        } else if s.eq_ignore_ascii_case("finished") {
            Some(Self::Finished)
        } else if s.eq_ignore_ascii_case("error") {
            Some(Self::Error)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_with_output() {
        let payload: SyncPayload =
            serde_json::from_str(r#"{"phase": "syncing", "output": "Fetching origin\n"}"#).unwrap();
        assert_eq!(payload.phase, "syncing");
        assert_eq!(payload.output.as_deref(), Some("Fetching origin\n"));
        assert_eq!(payload.message, None);
    }

    #[test]
    fn payload_ignores_extra_fields() {
        let payload: SyncPayload =
            serde_json::from_str(r#"{"phase": "finished", "elapsed": 3.2}"#).unwrap();
        assert_eq!(payload.phase, "finished");
    }

    #[test]
    fn payload_without_phase_rejected() {
        assert!(serde_json::from_str::<SyncPayload>(r#"{"output": "x"}"#).is_err());
    }

    #[test]
    fn wire_phase_is_case_insensitive() {
        assert_eq!(WirePhase::parse("syncing"), Some(WirePhase::Syncing));
        assert_eq!(WirePhase::parse("Finished"), Some(WirePhase::Finished));
        assert_eq!(WirePhase::parse("ERROR"), Some(WirePhase::Error));
        assert_eq!(WirePhase::parse("compressing"), None);
    }
}
