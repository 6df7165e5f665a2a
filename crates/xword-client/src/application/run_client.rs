//! The client event loop.
//!
//! ```text
//!   inbound RelayEvent ──▶ ClientSession::apply ─┐
//!   1 s timer tick ──────▶ ClientSession::tick  ─┼─▶ session ──▶ outbound ClientMessage
//!   autosolve tick ──────▶ autosolve::step      ─┘
//! ```
//!
//! The loop owns the [`ClientSession`] outright; every transition consumes
//! it and hands back the next one.  It ends when the relay closes, the
//! `running` flag is cleared, or (with `exit_on_win`) the board is solved.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use xword_core::{ClientMessage, ClientSession, Puzzle, ServerMessage};

use super::autosolve;
use crate::infrastructure::puzzle_source::{PuzzleSource, SourceError};
use crate::infrastructure::relay_conn::RelayEvent;

/// Loop failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The relay turned this client away.
    #[error("session is full")]
    SessionFull,

    /// The outbound queue to the relay is gone.
    #[error("relay connection dropped while sending")]
    OutboundClosed,
}

/// How the loop behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Timer refresh period.
    pub tick: Duration,
    /// Type one correct letter this often; `None` disables the bot.
    pub autosolve_every: Option<Duration>,
    /// Stop as soon as the board is solved.
    pub exit_on_win: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            autosolve_every: None,
            exit_on_win: false,
        }
    }
}

/// Wall-clock time in Unix epoch milliseconds.
pub fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Fetches the puzzle from `source`.
///
/// # Errors
///
/// Propagates the source's [`SourceError`].
pub async fn load_puzzle(source: &dyn PuzzleSource) -> Result<Arc<Puzzle>, SourceError> {
    info!("loading puzzle from {}", source.describe());
    let puzzle = source.fetch().await?;
    info!(
        "loaded \"{}\" by {} ({}x{}, {} across, {} down)",
        puzzle.title,
        puzzle.author,
        puzzle.rows(),
        puzzle.cols(),
        puzzle.h_clues.len(),
        puzzle.v_clues.len()
    );
    Ok(Arc::new(puzzle))
}

async fn send_all(outbound: &mpsc::Sender<ClientMessage>, outbox: Vec<ClientMessage>) -> Result<(), ClientError> {
    for msg in outbox {
        outbound.send(msg).await.map_err(|_| ClientError::OutboundClosed)?;
    }
    Ok(())
}

/// Waits for the next autosolve tick, or forever when the bot is off.
async fn next_bot_tick(bot: &mut Option<Interval>) {
    match bot {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Runs one client until it ends, returning the final session.
///
/// # Errors
///
/// - [`ClientError::SessionFull`] if the relay reports the session full.
/// - [`ClientError::OutboundClosed`] if an event cannot be queued.
pub async fn run_client(
    puzzle: Arc<Puzzle>,
    outbound: &mpsc::Sender<ClientMessage>,
    inbound: &mut mpsc::Receiver<RelayEvent>,
    options: &ClientOptions,
    running: Arc<AtomicBool>,
) -> Result<ClientSession, ClientError> {
    let mut session = ClientSession::new(puzzle);
    let mut timer_tick = interval(options.tick);
    timer_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut bot = options.autosolve_every.map(|every| {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });
    let mut announced_win = false;

    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown requested; leaving session");
            break;
        }
        if session.has_won() && !announced_win {
            announced_win = true;
            info!("puzzle solved in {}", session.timer().elapsed());
            if options.exit_on_win {
                break;
            }
        }

        tokio::select! {
            event = inbound.recv() => match event {
                Some(RelayEvent::Message(ServerMessage::SessionFull)) => {
                    warn!("relay reports the session is full");
                    return Err(ClientError::SessionFull);
                }
                Some(RelayEvent::Message(msg)) => {
                    debug!("applying {}", msg.event_name());
                    session = session.apply(msg, now_ms());
                }
                Some(RelayEvent::Closed) | None => {
                    info!("relay connection closed");
                    break;
                }
            },
            _ = timer_tick.tick() => {
                session = session.tick(now_ms());
            }
            _ = next_bot_tick(&mut bot) => {
                // Wait for a slot so the first move is not sent anonymously.
                if session.slot().is_some() && !session.has_won() {
                    let (next, outbox) = autosolve::step(session, now_ms());
                    session = next;
                    send_all(outbound, outbox).await?;
                }
            }
        }
    }

    Ok(session)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
