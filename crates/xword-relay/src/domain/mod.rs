//! Domain layer for xword-relay.
//!
//! Pure types with no I/O: identifiers and configuration.  The relay has no
//! puzzle state of its own; board contents only ever live on the clients.

pub mod config;
pub mod ids;

pub use config::{load_config, save_config, ConfigError, RelayConfig, RelayFile, RelaySection};
pub use ids::{ConnectionCounter, ConnectionId, SessionId};
