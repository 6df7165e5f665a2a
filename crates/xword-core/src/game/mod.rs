//! Per-player game logic.
//!
//! Everything here operates on one player's own copy of the board.  Nothing
//! in this module knows about other players; peer events reach these
//! functions through [`crate::session::ClientSession`].
//!
//! - **`board`** – The player's fill state ([`board::PlayerBoard`]) and
//!   per-cell render state ([`board::BoardStyling`]), plus win detection.
//! - **`actions`** – Reveal, check, and clear operations.
//! - **`navigation`** – Autotype: which square to focus after a letter.
//! - **`timer`** – Elapsed solving time.

pub mod actions;
pub mod board;
pub mod navigation;
pub mod timer;
