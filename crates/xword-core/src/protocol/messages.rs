//! Event types exchanged through the relay.
//!
//! # Event catalog
//!
//! | Event              | Direction         | Payload                                  |
//! |--------------------|-------------------|------------------------------------------|
//! | `getPlayerNumber`  | relay → client    | assigned slot                            |
//! | `playerMove`       | both              | `{playerNumber, playerState}`            |
//! | `input`            | both              | `{row, col, value, timer: {start}}`      |
//! | `revealWord`       | both              | `{row, col, isHorizontal}`               |
//! | `revealGrid`       | both              | initiating slot                          |
//! | `playerDisconnect` | relay → client    | vacated slot                             |
//! | `sessionFull`      | relay → client    | none; the relay closes the socket next   |
//!
//! The relay never interprets board contents: it stamps the sender's slot
//! into `playerMove` / `revealGrid` and forwards everything else verbatim.
//!
//! # Serde representation
//!
//! Adjacently tagged: `{"event": "<name>", "data": <payload>}`.  Payloads
//! that are a bare slot name (e.g. `revealGrid`) cannot use the internally
//! tagged form, so both enums use the adjacent form for uniformity.

use serde::{Deserialize, Serialize};

use super::slot::{PlayerState, Slot};
use crate::puzzle::model::{Direction, Position};

/// `playerMove` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMove {
    pub player_number: Slot,
    pub player_state: PlayerState,
}

/// Timer handshake carried by every `input`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerSync {
    /// Sender's timer start (Unix epoch ms), `null` if not started.
    pub start: Option<u64>,
}

/// `input` payload: a single cell write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellInput {
    pub row: usize,
    pub col: usize,
    /// `""` to clear, otherwise one uppercase letter.
    pub value: String,
    pub timer: TimerSync,
}

impl CellInput {
    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }
}

/// `revealWord` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordReveal {
    pub row: usize,
    pub col: usize,
    pub is_horizontal: bool,
}

impl WordReveal {
    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }

    pub fn direction(&self) -> Direction {
        Direction::from_is_horizontal(self.is_horizontal)
    }
}

/// Events a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    PlayerMove(PlayerMove),
    Input(CellInput),
    RevealWord(WordReveal),
    RevealGrid(Slot),
}

impl ClientMessage {
    /// Event name for log lines (payloads are not logged).
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientMessage::PlayerMove(_) => "playerMove",
            ClientMessage::Input(_) => "input",
            ClientMessage::RevealWord(_) => "revealWord",
            ClientMessage::RevealGrid(_) => "revealGrid",
        }
    }
}

/// Events the relay sends to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    GetPlayerNumber(Slot),
    PlayerMove(PlayerMove),
    Input(CellInput),
    RevealWord(WordReveal),
    RevealGrid(Slot),
    PlayerDisconnect(Slot),
    SessionFull,
}

impl ServerMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerMessage::GetPlayerNumber(_) => "getPlayerNumber",
            ServerMessage::PlayerMove(_) => "playerMove",
            ServerMessage::Input(_) => "input",
            ServerMessage::RevealWord(_) => "revealWord",
            ServerMessage::RevealGrid(_) => "revealGrid",
            ServerMessage::PlayerDisconnect(_) => "playerDisconnect",
            ServerMessage::SessionFull => "sessionFull",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
