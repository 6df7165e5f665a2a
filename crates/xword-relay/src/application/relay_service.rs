//! Event routing.
//!
//! Pure functions that turn "connection X sent event E" into a list of
//! [`Delivery`]s.  The relay treats board contents as opaque: it forwards
//! `input` and `revealWord` untouched and only overwrites the slot carried by
//! `playerMove` and `revealGrid` with the sender's actual slot, so a client
//! with a stale slot label cannot impersonate another player.
//!
//! ```text
//! ClientMessage ──stamp(sender slot)──▶ ServerMessage ──▶ every other member
//! ```

use thiserror::Error;
use xword_core::{ClientMessage, PlayerMove, ServerMessage, Slot};

use super::session_registry::{LeaveOutcome, SessionRegistry};
use crate::domain::ids::ConnectionId;

/// Routing failures.  All are local to the offending connection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    /// The sender has no slot (it was turned away or already left).
    #[error("{0} sent an event without holding a slot")]
    NotJoined(ConnectionId),
}

/// One event addressed to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub to: ConnectionId,
    pub message: ServerMessage,
}

/// Converts a client event into the relayed form, stamping `sender`.
pub fn stamp(msg: ClientMessage, sender: Slot) -> ServerMessage {
    match msg {
        ClientMessage::PlayerMove(m) => ServerMessage::PlayerMove(PlayerMove {
            player_number: sender,
            ..m
        }),
        ClientMessage::Input(input) => ServerMessage::Input(input),
        ClientMessage::RevealWord(reveal) => ServerMessage::RevealWord(reveal),
        ClientMessage::RevealGrid(_) => ServerMessage::RevealGrid(sender),
    }
}

/// Fans `msg` from `from` out to the other members of its session.
///
/// # Errors
///
/// Returns [`RelayError::NotJoined`] if `from` holds no slot.
pub fn route(registry: &SessionRegistry, from: ConnectionId, msg: ClientMessage) -> Result<Vec<Delivery>, RelayError> {
    let sender = registry.slot_of(from).ok_or(RelayError::NotJoined(from))?;
    let relayed = stamp(msg, sender);
    Ok(registry
        .peers_of(from)
        .into_iter()
        .map(|to| Delivery {
            to,
            message: relayed.clone(),
        })
        .collect())
}

/// The `getPlayerNumber` greeting for a newly joined connection.
pub fn welcome(to: ConnectionId, slot: Slot) -> Delivery {
    Delivery {
        to,
        message: ServerMessage::GetPlayerNumber(slot),
    }
}

/// `playerDisconnect` notices for everyone left behind by `outcome`.
pub fn departure_notices(outcome: &LeaveOutcome) -> Vec<Delivery> {
    outcome
        .remaining
        .iter()
        .map(|&to| Delivery {
            to,
            message: ServerMessage::PlayerDisconnect(outcome.vacated),
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
