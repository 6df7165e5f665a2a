//! xword-relay library crate.
//!
//! A WebSocket relay that lets up to three players co-solve one crossword.
//! The relay holds no puzzle state: it assigns each connection a slot within
//! its session and rebroadcasts events to the other members.
//!
//! # Architecture
//!
//! ```text
//! Player clients (JSON over WebSocket, ?session=<id>)
//!         ↕
//! [xword-relay]
//!   ├── domain/           SessionId, ConnectionId, RelayConfig + TOML file
//!   ├── application/      SessionRegistry (slots), routing and stamping
//!   └── infrastructure/
//!         └── ws_server/  accept loop, reader/writer tasks (tokio-tungstenite)
//! ```
//!
//! # Layer rules
//!
//! - `domain` does no network I/O.
//! - `application` depends on `domain` and `xword-core` only.
//! - `infrastructure` depends on all other layers plus `tokio` and `tungstenite`.

/// Domain layer: identifiers and configuration.
pub mod domain;

/// Application layer: session membership and event routing.
pub mod application;

/// Infrastructure layer: WebSocket server.
pub mod infrastructure;
