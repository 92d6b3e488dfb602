//! Realtime feed client
//!
//! WebSocket-based adapter for the owner-scoped push feed. `subscribe`
//! performs the handshake, then hands back a [`FeedHandle`] fed by a
//! background task. The adapter does not reconnect: if the connection
//! drops, the feed closes and the owning session re-seeds on the next
//! initialization.

use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::protocol::{ClientMessage, ServerMessage};
use super::{FeedCommand, FeedEvent, FeedHandle};
use crate::models::BookmarkId;

/// Handshake timeout in seconds
const HANDSHAKE_TIMEOUT: u64 = 10;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Errors establishing or negotiating a feed subscription
#[derive(Error, Debug)]
pub enum FeedError {
    /// Could not reach the feed service
    #[error("failed to connect to feed at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    /// Connection-level failure during the handshake
    #[error("feed connection failed: {0}")]
    Transport(String),

    /// The feed service refused the subscription
    #[error("feed rejected subscription: {0}")]
    Rejected(String),

    /// No acknowledgement within the handshake window
    #[error("timed out waiting for feed subscription acknowledgement")]
    HandshakeTimeout,

    /// The feed closed the connection during the handshake
    #[error("feed closed the connection during handshake")]
    ConnectionClosed,
}

/// Client for the realtime feed service
pub struct RealtimeClient {
    url: String,
}

impl RealtimeClient {
    /// Create a client for the feed at `url` (ws:// or wss://)
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
        }
    }

    /// The configured feed URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Subscribe to changes for an owner's rows
    ///
    /// Connects, sends the subscribe message, and waits for the
    /// acknowledgement; then spawns the pump task and returns its handle.
    pub async fn subscribe(&self, owner: &str) -> Result<FeedHandle, FeedError> {
        debug!(url = %self.url, owner = %owner, "connecting to feed");
        let (ws_stream, _response) =
            connect_async(&self.url)
                .await
                .map_err(|source| FeedError::Connect {
                    url: self.url.clone(),
                    source,
                })?;

        let (mut write, mut read) = ws_stream.split();

        let subscribe = ClientMessage::subscribe(owner).encode();
        write
            .send(Message::Text(subscribe))
            .await
            .map_err(|err| FeedError::Transport(err.to_string()))?;

        self.await_ack(&mut read).await?;
        info!(owner = %owner, "feed subscription established");

        let (event_tx, event_rx) = mpsc::channel(64);
        let (command_tx, command_rx) = mpsc::channel(16);

        tokio::spawn(feed_task(
            write,
            read,
            owner.to_string(),
            event_tx,
            command_rx,
        ));

        Ok(FeedHandle::new(event_rx, command_tx))
    }

    /// Wait for the subscription acknowledgement, with a deadline
    async fn await_ack(&self, read: &mut WsSource) -> Result<(), FeedError> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(HANDSHAKE_TIMEOUT);

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Err(FeedError::HandshakeTimeout);
            }

            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => match ServerMessage::decode(&text) {
                            Ok(ServerMessage::Subscribed { .. }) => return Ok(()),
                            Ok(ServerMessage::Error { message }) => {
                                return Err(FeedError::Rejected(message));
                            }
                            Ok(_) => {
                                // Nothing else is expected before the ack
                            }
                            Err(err) => {
                                debug!(%err, "undecodable handshake message");
                            }
                        },
                        Some(Ok(Message::Close(_))) | None => {
                            return Err(FeedError::ConnectionClosed);
                        }
                        Some(Err(err)) => {
                            return Err(FeedError::Transport(err.to_string()));
                        }
                        _ => {}
                    }
                }
                _ = tokio::time::sleep(remaining) => {
                    return Err(FeedError::HandshakeTimeout);
                }
            }
        }
    }
}

/// Pump feed messages into the event channel until shutdown or disconnect
async fn feed_task(
    mut write: WsSink,
    mut read: WsSource,
    owner: String,
    event_tx: mpsc::Sender<FeedEvent>,
    mut commands: mpsc::Receiver<FeedCommand>,
) {
    loop {
        tokio::select! {
            cmd = commands.recv() => {
                if matches!(cmd, Some(FeedCommand::Shutdown) | None) {
                    let leave = ClientMessage::unsubscribe(&owner).encode();
                    let _ = write.send(Message::Text(leave)).await;
                    let _ = write.close().await;
                    debug!(owner = %owner, "feed unsubscribed");
                    break;
                }
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match ServerMessage::decode(&text) {
                        Ok(ServerMessage::Inserted { record }) => {
                            if event_tx.send(FeedEvent::Insert(record)).await.is_err() {
                                break;
                            }
                        }
                        Ok(ServerMessage::Deleted { id }) => {
                            let event = FeedEvent::Delete(BookmarkId::confirmed(id));
                            if event_tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        Ok(ServerMessage::Error { message }) => {
                            warn!(%message, "feed reported error");
                        }
                        Ok(_) => {}
                        Err(err) => {
                            debug!(%err, "undecodable feed message");
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("feed connection closed");
                        break;
                    }
                    Some(Err(err)) => {
                        warn!(%err, "feed connection error");
                        break;
                    }
                    _ => {
                        // Ping/pong/binary - ignore
                    }
                }
            }
        }
    }
}
