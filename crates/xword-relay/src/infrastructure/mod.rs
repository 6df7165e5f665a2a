//! Infrastructure layer for xword-relay.
//!
//! Handles all I/O: the TCP listener, the WebSocket upgrade, and the
//! per-connection reader and writer tasks.
//!
//! # What does NOT belong here?
//!
//! - Slot assignment and routing decisions (application layer)
//! - Identifier and config types (domain layer)
//! - CLI parsing (done in `main.rs`)

pub mod ws_server;

pub use ws_server::{run_server, serve};
