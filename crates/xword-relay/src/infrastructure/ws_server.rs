//! WebSocket server: accept loop and per-connection task management.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Upgrading each accepted connection to a WebSocket, reading the session
//!    id from the `?session=` query string during the handshake.
//! 3. Assigning a slot through the shared [`SessionRegistry`], or turning the
//!    connection away with `sessionFull` when all three slots are taken.
//! 4. Running two tasks per joined connection:
//!    - **Reader**: decodes client events and fans them out to the other
//!      members' outbound queues.
//!    - **Writer**: drains this connection's outbound queue into the socket.
//! 5. Broadcasting `playerDisconnect` to the remaining members when a
//!    connection closes.
//! 6. Stopping the accept loop when the `running` flag is cleared.
//!
//! # Shared state
//!
//! The registry and the per-connection outbound senders live together in one
//! [`Hub`] behind a `tokio::sync::Mutex`.  The lock is only held while the
//! registry is consulted; the actual `send().await` onto a peer's queue happens
//! after it is released, so a slow peer never stalls routing for others.  A
//! joiner's greeting is queued under the same lock that publishes its outbox,
//! so no peer event can overtake it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_hdr_async_with_config,
    tungstenite::{
        handshake::server::{ErrorResponse, Request, Response},
        http::StatusCode,
        protocol::WebSocketConfig,
        Error as WsError, Message as WsMessage,
    },
};
use tracing::{debug, error, info, warn};

use xword_core::{decode_client, encode_server, ServerMessage};

use crate::application::{departure_notices, route, welcome, Delivery, JoinOutcome, SessionRegistry};
use crate::domain::config::RelayConfig;
use crate::domain::ids::{ConnectionCounter, ConnectionId, SessionId};

type Outbox = mpsc::Sender<ServerMessage>;

// ── Shared hub ────────────────────────────────────────────────────────────────

/// Registry plus the outbound queue of every joined connection.
#[derive(Default)]
struct Hub {
    registry: SessionRegistry,
    outboxes: HashMap<ConnectionId, Outbox>,
}

impl Hub {
    /// Registers `conn` and claims a slot in `session`.
    ///
    /// On `Joined` the `getPlayerNumber` greeting is queued on `outbox` before
    /// the outbox is published, so it is always the first frame the member
    /// sees.  On `Full`, or on any failure, the connection is forgotten again.
    fn admit(&mut self, conn: ConnectionId, session: SessionId, outbox: &Outbox) -> anyhow::Result<JoinOutcome> {
        self.registry.connect(conn);
        let outcome = match self.registry.join(conn, session) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.registry.disconnect(conn);
                return Err(e).with_context(|| format!("{conn}: join failed"));
            }
        };
        let slot = match outcome {
            JoinOutcome::Joined { slot, .. } => slot,
            JoinOutcome::Full => {
                self.registry.disconnect(conn);
                return Ok(JoinOutcome::Full);
            }
        };
        let greeting = welcome(conn, slot);
        if let Err(e) = outbox.try_send(greeting.message) {
            self.registry.disconnect(conn);
            anyhow::bail!("{conn}: failed to queue greeting: {e}");
        }
        self.outboxes.insert(conn, outbox.clone());
        Ok(outcome)
    }

    /// Forgets `conn` and addresses the `playerDisconnect` notices its
    /// departure causes.
    fn depart(&mut self, conn: ConnectionId) -> Vec<(Outbox, ServerMessage)> {
        self.outboxes.remove(&conn);
        let Some(outcome) = self.registry.disconnect(conn) else {
            return Vec::new();
        };
        for (member, new_slot) in &outcome.renumbered {
            debug!("{member}: now {new_slot} in session {}", outcome.session);
        }
        info!(
            "{conn}: left session {} ({} vacated, {} remaining)",
            outcome.session,
            outcome.vacated,
            outcome.remaining.len()
        );
        self.address(departure_notices(&outcome))
    }

    /// Pairs each delivery with its target's queue.  Targets without a queue
    /// (already gone) are skipped.
    fn address(&self, deliveries: Vec<Delivery>) -> Vec<(Outbox, ServerMessage)> {
        deliveries
            .into_iter()
            .filter_map(|d| self.outboxes.get(&d.to).map(|tx| (tx.clone(), d.message)))
            .collect()
    }
}

type SharedHub = Arc<Mutex<Hub>>;

/// Pushes addressed messages onto their queues, in order.
async fn dispatch(targets: Vec<(Outbox, ServerMessage)>) {
    for (tx, message) in targets {
        let event = message.event_name();
        if tx.send(message).await.is_err() {
            debug!("dropped {event}: recipient queue closed");
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Runs the relay until `running` is set to `false`.
///
/// Binds `config.bind_addr` and hands the listener to [`serve`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound (e.g., the port is
/// already in use).
pub async fn run_server(config: RelayConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind relay listener on {}", config.bind_addr))?;

    info!("crossword relay listening on {}", config.bind_addr);
    serve(listener, config, running).await
}

/// Runs the accept loop on an already bound listener.
///
/// Each accepted connection is handed to its own Tokio task.  The accept
/// call is wrapped in a 200 ms timeout so the `running` flag is checked
/// regularly even when nobody connects.
///
/// # Errors
///
/// Currently never fails; accept errors are logged and the loop continues.
pub async fn serve(listener: TcpListener, config: RelayConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    let config = Arc::new(config);
    let hub: SharedHub = Arc::new(Mutex::new(Hub::default()));
    let counter = ConnectionCounter::new();

    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        match timeout(Duration::from_millis(200), listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                let conn = counter.next();
                debug!("{conn}: accepted TCP connection from {peer_addr}");
                let cfg = Arc::clone(&config);
                let hub = Arc::clone(&hub);
                tokio::spawn(async move {
                    handle_connection(stream, peer_addr, conn, cfg, hub).await;
                });
            }
            Ok(Err(e)) => {
                error!("accept error: {e}");
            }
            Err(_) => {
                // No connection in the last 200 ms; re-check `running`.
            }
        }
    }

    info!("relay stopped after {} connections", counter.allocated());
    Ok(())
}

// ── Per-connection handler ────────────────────────────────────────────────────

/// Task entry point: runs [`run_connection`] and logs how it ended.
async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    conn: ConnectionId,
    config: Arc<RelayConfig>,
    hub: SharedHub,
) {
    match run_connection(stream, peer_addr, conn, config, hub).await {
        Ok(()) => info!("{conn}: closed normally"),
        Err(e) => warn!("{conn}: closed with error: {e:#}"),
    }
}

/// Builds the HTTP 400 returned when the upgrade request names no usable
/// session.
fn missing_session_response() -> ErrorResponse {
    let mut response = ErrorResponse::new(Some("missing or malformed ?session= query parameter".to_string()));
    *response.status_mut() = StatusCode::BAD_REQUEST;
    response
}

/// Runs the full lifecycle of one connection.
///
/// # Errors
///
/// Returns an error if the WebSocket handshake fails (including a missing or
/// malformed session id), the join is refused by the registry, or the
/// `sessionFull` notice cannot be written.
async fn run_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    conn: ConnectionId,
    config: Arc<RelayConfig>,
    hub: SharedHub,
) -> anyhow::Result<()> {
    // ── Step 1: Handshake, capturing the session id ────────────────────────────
    let mut requested: Option<SessionId> = None;
    let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        match SessionId::from_query(request.uri().query()) {
            Some(session) => {
                requested = Some(session);
                Ok(response)
            }
            None => Err(missing_session_response()),
        }
    };

    let mut ws_config = WebSocketConfig::default();
    ws_config.max_message_size = Some(config.max_message_bytes);
    ws_config.max_frame_size = Some(config.max_message_bytes);

    let mut ws_stream = accept_hdr_async_with_config(stream, callback, Some(ws_config))
        .await
        .with_context(|| format!("{conn}: WebSocket handshake failed with {peer_addr}"))?;
    let session = requested.with_context(|| format!("{conn}: handshake completed without a session id"))?;

    // ── Step 2: Claim a slot ───────────────────────────────────────────────────
    let (outbox_tx, mut outbox_rx) = mpsc::channel::<ServerMessage>(config.outbound_queue.max(1));
    let joined = hub.lock().await.admit(conn, session.clone(), &outbox_tx)?;
    drop(outbox_tx);

    match joined {
        JoinOutcome::Joined { slot, peers } => {
            info!("{conn}: joined session {session} as {slot} ({} already present)", peers.len());
        }
        JoinOutcome::Full => {
            info!("{conn}: session {session} is full; turning connection away");
            let frame = encode_server(&ServerMessage::SessionFull)?;
            ws_stream
                .send(WsMessage::Text(frame))
                .await
                .with_context(|| format!("{conn}: failed to send sessionFull"))?;
            // The peer may already be gone; the close is best effort.
            let _ = ws_stream.close(None).await;
            return Ok(());
        }
    }

    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    // ── Task A: Outbound queue → socket ───────────────────────────────────────
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbox_rx.recv().await {
            let event = message.event_name();
            let frame = match encode_server(&message) {
                Ok(f) => f,
                Err(e) => {
                    error!("{conn}: failed to encode {event}: {e}");
                    continue;
                }
            };
            if ws_tx.send(WsMessage::Text(frame)).await.is_err() {
                debug!("{conn}: WebSocket send failed (peer disconnected)");
                break;
            }
            debug!("{conn}: sent {event}");
        }
        let _ = ws_tx.close().await;
    });

    // ── Task B: Socket → peers ────────────────────────────────────────────────
    let hub_reader = Arc::clone(&hub);
    let reader_task = tokio::spawn(async move {
        loop {
            let ws_msg = match ws_rx.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                    debug!("{conn}: WebSocket closed");
                    break;
                }
                Some(Err(e)) => {
                    warn!("{conn}: WebSocket error: {e}");
                    break;
                }
                None => {
                    debug!("{conn}: stream ended");
                    break;
                }
            };

            match ws_msg {
                WsMessage::Text(text) => {
                    let event = match decode_client(&text) {
                        Ok(e) => e,
                        Err(e) => {
                            warn!("{conn}: ignoring malformed frame: {e}");
                            continue;
                        }
                    };
                    let name = event.event_name();
                    let targets = {
                        let hub = hub_reader.lock().await;
                        match route(&hub.registry, conn, event) {
                            Ok(deliveries) => hub.address(deliveries),
                            Err(e) => {
                                warn!("{conn}: {e}");
                                continue;
                            }
                        }
                    };
                    debug!("{conn}: relaying {name} to {} peers", targets.len());
                    dispatch(targets).await;
                }
                WsMessage::Binary(_) => {
                    warn!("{conn}: unexpected binary frame (ignored)");
                }
                WsMessage::Ping(data) => {
                    debug!("{conn}: WebSocket ping ({} bytes)", data.len());
                }
                WsMessage::Pong(_) => {
                    debug!("{conn}: WebSocket pong received");
                }
                WsMessage::Close(_) => {
                    debug!("{conn}: Close frame received");
                    break;
                }
                WsMessage::Frame(_) => {
                    debug!("{conn}: raw frame (ignored)");
                }
            }
        }
    });

    // ── Wait for either side to finish ─────────────────────────────────────────
    let reader_abort = reader_task.abort_handle();
    let writer_abort = writer_task.abort_handle();
    tokio::select! {
        _ = reader_task => debug!("{conn}: reader finished"),
        _ = writer_task => debug!("{conn}: writer finished"),
    }
    reader_abort.abort();
    writer_abort.abort();

    // ── Departure ─────────────────────────────────────────────────────────────
    let notices = hub.lock().await.depart(conn);
    dispatch(notices).await;

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
