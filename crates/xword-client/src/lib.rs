//! xword-client library crate.
//!
//! A headless co-solver: it loads a puzzle, joins a relay session, mirrors
//! every peer's moves into its own board and can optionally solve the
//! puzzle itself, one letter at a time.
//!
//! # Architecture
//!
//! ```text
//! [xword-client]
//!   ├── application/
//!   │     ├── run_client   event loop around ClientSession
//!   │     └── autosolve    next-correct-letter bot
//!   └── infrastructure/
//!         ├── puzzle_source  file / HTTP feed (reqwest)
//!         └── relay_conn     WebSocket to the relay (tokio-tungstenite)
//!         ↕
//! xword-relay  (JSON events over WebSocket)
//! ```

/// Application layer: the client loop and the bot.
pub mod application;

/// Infrastructure layer: puzzle sources and the relay connection.
pub mod infrastructure;
