//! Real-time co-solving protocol.
//!
//! Events travel as JSON text frames over a WebSocket, one event per frame:
//!
//! ```text
//! {"event":"input","data":{"row":0,"col":2,"value":"C","timer":{"start":1700000000000}}}
//! ```

pub mod codec;
pub mod messages;
pub mod slot;
