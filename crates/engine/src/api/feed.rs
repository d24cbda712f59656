//! Live registration feed client.
//!
//! Connects to the registration server's WebSocket and forwards every text
//! frame, unparsed, to the runner. Parsing and deduplication belong to the
//! engine. The connection is retried after a fixed delay whenever it fails or
//! the server closes it, until the receiving side goes away.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Failed to connect to {url}: {message}")]
    Connect { url: String, message: String },
    #[error("Feed connection lost: {0}")]
    Receive(String),
}

/// Why one connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedEnd {
    Closed,
    ReceiverGone,
}

pub struct FeedClient {
    url: String,
    reconnect_delay: Duration,
}

impl FeedClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_delay: RECONNECT_DELAY,
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run the feed on its own task.
    pub fn spawn(self, tx: mpsc::Sender<String>) -> JoinHandle<()> {
        tokio::spawn(self.run(tx))
    }

    /// Keep a connection open until `tx` is closed.
    pub async fn run(self, tx: mpsc::Sender<String>) {
        loop {
            match self.pump(&tx).await {
                Ok(FeedEnd::ReceiverGone) => {
                    tracing::debug!("Feed receiver dropped, stopping");
                    return;
                }
                Ok(FeedEnd::Closed) => {
                    tracing::info!(url = %self.url, "Registration feed closed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Registration feed unavailable");
                }
            }
            if tx.is_closed() {
                return;
            }
            tracing::info!(
                delay_ms = self.reconnect_delay.as_millis() as u64,
                "Reconnecting to registration feed"
            );
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    async fn pump(&self, tx: &mpsc::Sender<String>) -> Result<FeedEnd, FeedError> {
        let (mut ws, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| FeedError::Connect {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        tracing::info!(url = %self.url, "Connected to registration feed");

        while let Some(message) = ws.next().await {
            match message.map_err(|e| FeedError::Receive(e.to_string()))? {
                Message::Text(text) => {
                    if tx.send(text).await.is_err() {
                        return Ok(FeedEnd::ReceiverGone);
                    }
                }
                Message::Close(_) => return Ok(FeedEnd::Closed),
                Message::Binary(bytes) => {
                    tracing::debug!(len = bytes.len(), "Ignoring binary feed frame");
                }
                _ => {}
            }
        }
        Ok(FeedEnd::Closed)
    }
}
