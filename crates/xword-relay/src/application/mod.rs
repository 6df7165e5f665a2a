//! Application layer for xword-relay.
//!
//! Knows *what* the relay does with a connection or an event: who holds which
//! slot, and who receives what.  It never touches sockets or tasks.

pub mod relay_service;
pub mod session_registry;

pub use relay_service::{departure_notices, route, stamp, welcome, Delivery, RelayError};
pub use session_registry::{ConnectionState, JoinOutcome, LeaveOutcome, RegistryError, SessionRegistry};
