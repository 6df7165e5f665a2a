//! Application layer for xword-client.
//!
//! Drives a [`xword_core::ClientSession`] from relay events, a local timer
//! and the optional autosolve bot.  Talks to the outside world only through
//! channels and the [`PuzzleSource`](crate::infrastructure::PuzzleSource)
//! trait, so every path is testable without a network.

pub mod autosolve;
pub mod run_client;

pub use run_client::{load_puzzle, now_ms, run_client, ClientError, ClientOptions};
