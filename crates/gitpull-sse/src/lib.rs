//! HTTP transport for sync sessions: a `text/event-stream` decoder and an
//! [`EventChannel`](gitpull::EventChannel) built on reqwest.

pub mod channel;
pub mod decoder;

pub use channel::SseChannel;
pub use decoder::{SseDecoder, SseFrame};

use gitpull::{ChannelEvent, Phase, SessionError, SyncSession};
use tracing::warn;

/// Open the session's sync URL and drive the session to a terminal phase.
///
/// Failing to connect (network error, non-2xx status, wrong content type) is
/// reported to subscribers as a transport error, like a stream that breaks
/// midway. Only a base URL that cannot be turned into a request URL is
/// returned as an error, before anything is emitted.
pub async fn start_session(
    session: &mut SyncSession,
    client: &reqwest::Client,
) -> Result<Phase, SessionError> {
    let url = session.params().sync_url()?;

    match SseChannel::connect(client, url).await {
        Ok(channel) => session.attach(Box::new(channel)),
        Err(e) => {
            warn!("could not open sync event stream: {e}");
            session.handle(ChannelEvent::TransportError(e.to_string()));
        }
    }

    Ok(session.run().await)
}
