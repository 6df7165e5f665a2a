//! WebSocket connection to the relay.
//!
//! [`RelayConnection::connect`] opens `ws://<relay>/?session=<id>` and splits
//! the socket into two background tasks:
//!
//! - **writer**: drains the outbound `mpsc` queue, encoding each
//!   [`ClientMessage`] as a JSON text frame;
//! - **reader**: decodes text frames into [`ServerMessage`]s and forwards
//!   them as [`RelayEvent::Message`], then emits a final
//!   [`RelayEvent::Closed`] when the socket ends.
//!
//! The application layer only ever sees the two channel ends.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, info, warn};

use xword_core::{decode_server, encode_client, ClientMessage, GameId, ServerMessage};

/// Capacity of the inbound and outbound queues.
const QUEUE_CAPACITY: usize = 128;

/// Failures while establishing the relay connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("session id must not be empty")]
    EmptySession,

    #[error("session id {0:?} may only contain letters, digits, '-', '.', '_' and '~'")]
    InvalidSession(String),

    #[error("failed to connect to relay at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: WsError,
    },
}

/// Inbound events delivered to the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    Message(ServerMessage),
    /// The socket closed; no further events follow.
    Closed,
}

/// Builds the relay URL for `session`.
///
/// `relay` may be a bare `host:port` or already carry a `ws://` / `wss://`
/// scheme; a trailing `/` is tolerated.
pub fn relay_url(relay: &str, session: &str) -> String {
    let relay = relay.trim_end_matches('/');
    if relay.starts_with("ws://") || relay.starts_with("wss://") {
        format!("{relay}/?session={session}")
    } else {
        format!("ws://{relay}/?session={session}")
    }
}

/// A live relay connection.
///
/// Dropping it stops both background tasks.
pub struct RelayConnection {
    pub outbound: mpsc::Sender<ClientMessage>,
    pub inbound: mpsc::Receiver<RelayEvent>,
    writer: JoinHandle<()>,
    reader: JoinHandle<()>,
}

impl RelayConnection {
    /// Connects to `relay` and joins `session`.
    ///
    /// # Errors
    ///
    /// - [`ConnectionError::EmptySession`] if `session` is blank.
    /// - [`ConnectionError::InvalidSession`] if it holds characters the relay
    ///   refuses.
    /// - [`ConnectionError::Connect`] if the TCP connect or WebSocket
    ///   handshake fails (including the relay's HTTP 400 for a bad session).
    pub async fn connect(relay: &str, session: &str) -> Result<Self, ConnectionError> {
        let session = session.trim();
        if session.is_empty() {
            return Err(ConnectionError::EmptySession);
        }
        if !GameId::is_well_formed(session) {
            return Err(ConnectionError::InvalidSession(session.to_string()));
        }
        let url = relay_url(relay, session);
        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|source| ConnectionError::Connect { url: url.clone(), source })?;
        info!("connected to relay at {url}");

        let (mut ws_tx, mut ws_rx) = ws_stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<ClientMessage>(QUEUE_CAPACITY);
        let (inbound_tx, inbound_rx) = mpsc::channel::<RelayEvent>(QUEUE_CAPACITY);

        let writer = tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                let event = msg.event_name();
                let frame = match encode_client(&msg) {
                    Ok(f) => f,
                    Err(e) => {
                        warn!("failed to encode {event}: {e}");
                        continue;
                    }
                };
                if ws_tx.send(WsMessage::Text(frame)).await.is_err() {
                    debug!("relay send failed (connection closed)");
                    break;
                }
                debug!("sent {event}");
            }
            let _ = ws_tx.close().await;
        });

        let reader = tokio::spawn(async move {
            loop {
                let ws_msg = match ws_rx.next().await {
                    Some(Ok(msg)) => msg,
                    Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) | None => break,
                    Some(Err(e)) => {
                        warn!("relay WebSocket error: {e}");
                        break;
                    }
                };
                match ws_msg {
                    WsMessage::Text(text) => match decode_server(&text) {
                        Ok(msg) => {
                            debug!("received {}", msg.event_name());
                            if inbound_tx.send(RelayEvent::Message(msg)).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => warn!("ignoring malformed relay frame: {e}"),
                    },
                    WsMessage::Close(_) => break,
                    _ => {}
                }
            }
            let _ = inbound_tx.send(RelayEvent::Closed).await;
        });

        Ok(Self {
            outbound: outbound_tx,
            inbound: inbound_rx,
            writer,
            reader,
        })
    }
}

impl Drop for RelayConnection {
    fn drop(&mut self) {
        self.writer.abort();
        self.reader.abort();
    }
}
