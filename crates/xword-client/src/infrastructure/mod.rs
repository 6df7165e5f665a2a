//! Infrastructure layer for xword-client.
//!
//! # Responsibilities
//!
//! - Fetching the puzzle from a file or the upstream HTTP feed
//! - Opening the WebSocket to the relay and pumping frames through channels

pub mod puzzle_source;
pub mod relay_conn;

pub use puzzle_source::{FileFeedSource, HttpFeedSource, PuzzleSource, SourceError};
pub use relay_conn::{relay_url, ConnectionError, RelayConnection, RelayEvent};
