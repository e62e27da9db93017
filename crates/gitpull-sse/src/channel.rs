use std::collections::VecDeque;

use futures::stream::{BoxStream, Stream, StreamExt};
use gitpull::{ChannelError, ChannelEvent, EventChannel};
use tracing::{debug, trace};

use crate::decoder::{SseDecoder, SseFrame};

const EVENT_STREAM: &str = "text/event-stream";

/// Event channel backed by a streaming HTTP response.
///
/// Only `message` events are forwarded. The channel never reconnects; a
/// broken body surfaces once as [`ChannelEvent::TransportError`] and the
/// channel then reports end of stream.
pub struct SseChannel {
    stream: Option<BoxStream<'static, Result<Vec<u8>, String>>>,
    decoder: SseDecoder,
    pending: VecDeque<SseFrame>,
}

impl SseChannel {
    /// Open `url` as an event stream.
    pub async fn connect(
        client: &reqwest::Client,
        url: reqwest::Url,
    ) -> Result<Self, ChannelError> {
        debug!(%url, "opening sync event stream");

        let response = client
            .get(url)
            .header("Accept", EVENT_STREAM)
            .header("Cache-Control", "no-cache")
            .header("User-Agent", "gitpull")
            .send()
            .await
            .map_err(|e| ChannelError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get("Content-Type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        if !content_type.starts_with(EVENT_STREAM) {
            return Err(ChannelError::ContentType(content_type));
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(|e| e.to_string()));
        Ok(Self::from_stream(body))
    }

    /// Wrap an already-open byte stream.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Vec<u8>, String>> + Send + 'static,
    {
        Self {
            stream: Some(stream.boxed()),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
        }
    }
}

#[async_trait::async_trait]
impl EventChannel for SseChannel {
    async fn next_event(&mut self) -> Option<ChannelEvent> {
        loop {
            while let Some(frame) = self.pending.pop_front() {
                if frame.event == "message" {
                    return Some(ChannelEvent::Message(frame.data));
                }
                trace!(event = %frame.event, "skipping named event");
            }

            let stream = self.stream.as_mut()?;
            match stream.next().await {
                Some(Ok(chunk)) => self.pending.extend(self.decoder.feed(&chunk)),
                Some(Err(reason)) => {
                    self.stream = None;
                    return Some(ChannelEvent::TransportError(reason));
                }
                None => {
                    self.stream = None;
                    return None;
                }
            }
        }
    }

    fn close(&mut self) {
        self.stream = None;
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;

    fn chunks(parts: &[&str]) -> SseChannel {
        let items: Vec<Result<Vec<u8>, String>> =
            parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
        SseChannel::from_stream(stream::iter(items))
    }

    #[tokio::test]
    async fn yields_messages_across_chunks() {
        let mut channel = chunks(&["data: {\"phase\":", "\"syncing\"}\n\ndata: b\n\n"]);

        assert_eq!(
            channel.next_event().await,
            Some(ChannelEvent::Message("{\"phase\":\"syncing\"}".into()))
        );
        assert_eq!(channel.next_event().await, Some(ChannelEvent::Message("b".into())));
        assert_eq!(channel.next_event().await, None);
    }

    #[tokio::test]
    async fn skips_named_events() {
        let mut channel = chunks(&["event: ping\ndata: x\n\ndata: y\n\n"]);
        assert_eq!(channel.next_event().await, Some(ChannelEvent::Message("y".into())));
    }

    #[tokio::test]
    async fn body_error_reported_once() {
        let items: Vec<Result<Vec<u8>, String>> = vec![
            Ok(b"data: a\n\n".to_vec()),
            Err("connection reset".into()),
            Ok(b"data: b\n\n".to_vec()),
        ];
        let mut channel = SseChannel::from_stream(stream::iter(items));

        assert_eq!(channel.next_event().await, Some(ChannelEvent::Message("a".into())));
        assert_eq!(
            channel.next_event().await,
            Some(ChannelEvent::TransportError("connection reset".into()))
        );
        assert_eq!(channel.next_event().await, None);
    }

    #[tokio::test]
    async fn close_discards_buffered_frames() {
        let mut channel = chunks(&["data: a\n\ndata: b\n\n"]);
        assert!(channel.next_event().await.is_some());

        channel.close();
        channel.close();

        assert_eq!(channel.next_event().await, None);
    }
}
