//! Invalidation-channel subscriber.
//!
//! Connects to the store's `/ws` endpoint and forwards every typed
//! [`ChangeEvent`] to the consumer. Connect this *before* the initial
//! fetch: the fetch is then authoritative and the channel only signals
//! subsequent changes, so there is never a reason to poll.
//!
//! A dropped connection is retried with capped exponential backoff. There
//! is no replay on the server side, so catch-up after a reconnect is the
//! consumer's own refetch - which is what every event asks for anyway.

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use voltstore_core::ChangeEvent;

/// First retry delay after a drop.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
/// Backoff ceiling.
const MAX_BACKOFF: Duration = Duration::from_secs(30);
/// Buffered events per subscriber.
const CHANNEL_CAPACITY: usize = 32;

/// Channel setup errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("cannot derive a WebSocket URL from {0}")]
    BadBaseUrl(Url),
}

/// Subscriber for the store's invalidation channel.
#[derive(Debug, Clone)]
pub struct ChannelClient {
    url: Url,
}

impl ChannelClient {
    /// Derive the channel endpoint from the API base URL
    /// (`http(s)` becomes `ws(s)`, path `/ws`).
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::BadBaseUrl` for URLs that cannot carry a
    /// WebSocket scheme.
    pub fn new(base_url: &Url) -> Result<Self, ChannelError> {
        let mut url = base_url
            .join("ws")
            .map_err(|_| ChannelError::BadBaseUrl(base_url.clone()))?;

        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            _ => return Err(ChannelError::BadBaseUrl(base_url.clone())),
        };
        url.set_scheme(scheme)
            .map_err(|()| ChannelError::BadBaseUrl(base_url.clone()))?;

        Ok(Self { url })
    }

    /// The derived WebSocket URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Spawn the connection task and return the event stream.
    ///
    /// The task reconnects with capped exponential backoff until the
    /// receiver is dropped. Events that arrive while the consumer is slow
    /// beyond the buffer are waited on, not dropped: this is a low-volume
    /// signal channel.
    #[must_use]
    pub fn subscribe(&self) -> mpsc::Receiver<ChangeEvent> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(run(self.url.clone(), tx));
        rx
    }
}

/// Connection loop: connect, pump events, back off, repeat.
async fn run(url: Url, tx: mpsc::Sender<ChangeEvent>) {
    let mut backoff = INITIAL_BACKOFF;

    loop {
        match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                tracing::debug!(url = %url, "invalidation channel connected");
                backoff = INITIAL_BACKOFF;

                let (_, mut read) = stream.split();
                while let Some(message) = read.next().await {
                    match message {
                        Ok(Message::Text(text)) => {
                            match serde_json::from_str::<ChangeEvent>(text.as_str()) {
                                Ok(event) => {
                                    if tx.send(event).await.is_err() {
                                        // Consumer gone; stop for good.
                                        return;
                                    }
                                }
                                Err(e) => {
                                    tracing::debug!(error = %e, "ignoring unknown channel message");
                                }
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::debug!(error = %e, "invalidation channel read failed");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "invalidation channel connect failed");
            }
        }

        if tx.is_closed() {
            return;
        }

        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}
