//! # xword-core
//!
//! Shared library for the crossword co-solving system: the puzzle feed
//! parser, board and navigation logic, and the real-time event protocol.
//!
//! This crate is used by both the relay server and the client.
//! It has no dependencies on sockets, async runtimes, or UI frameworks.
//!
//! # Architecture overview (for beginners)
//!
//! Players solve the same crossword together.  Each player runs a client that
//! keeps its own copy of the board; a relay server forwards every cursor move
//! and letter typed to the other players in the same game session, so that
//! all copies converge.
//!
//! This crate (`xword-core`) is the shared foundation.  It defines:
//!
//! - **`puzzle`** – The read-only puzzle: parsing the upstream fixed-layout
//!   text feed into a grid of squares plus the horizontal and vertical clue
//!   lists, and the clue-number annotation of every square.
//!
//! - **`game`** – What a player does to their own copy of the board: typing,
//!   autotype navigation, reveal/check actions, win detection, and the timer.
//!
//! - **`protocol`** – The JSON events exchanged through the relay and the
//!   fixed set of player slots they refer to.
//!
//! - **`session`** – [`ClientSession`], the explicit per-client state that
//!   applies local actions and peer events as plain state transitions.
//!
//! ```text
//! feed blob ──parse_feed──▶ Puzzle ──▶ ClientSession ◀──▶ relay ◀──▶ peers
//!                                          │
//!                                   PlayerBoard / BoardStyling / Timer
//! ```

pub mod game;
pub mod protocol;
pub mod puzzle;
pub mod session;

// Re-export the most-used types at the crate root so callers can write
// `xword_core::Puzzle` instead of `xword_core::puzzle::model::Puzzle`.
pub use game::board::{BoardStyling, CellStyle, Fill, PlayerBoard};
pub use game::navigation::{next_square, Cursor};
pub use game::timer::{Elapsed, Timer};
pub use protocol::codec::{decode_client, decode_server, encode_client, encode_server, ProtocolError};
pub use protocol::messages::{CellInput, ClientMessage, PlayerMove, ServerMessage, TimerSync, WordReveal};
pub use protocol::slot::{PlayerState, PlayerStates, Slot};
pub use puzzle::feed::{feed_url, FeedDate, GameId, DEFAULT_FEED_BASE};
pub use puzzle::model::{Clue, CrosswordResponse, Direction, Position, Puzzle, Square};
pub use puzzle::derive::{derive, word_cells};
pub use puzzle::parser::{parse_feed, ParseError};
pub use session::ClientSession;
