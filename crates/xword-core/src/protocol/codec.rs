//! Text-frame codec for protocol events.

use thiserror::Error;

use super::messages::{ClientMessage, ServerMessage};

/// Errors from encoding or decoding an event frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame is not valid JSON or does not match any known event.
    #[error("malformed event frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub fn encode_client(msg: &ClientMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(msg)?)
}

pub fn decode_client(frame: &str) -> Result<ClientMessage, ProtocolError> {
    Ok(serde_json::from_str(frame)?)
}

pub fn encode_server(msg: &ServerMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(msg)?)
}

pub fn decode_server(frame: &str) -> Result<ServerMessage, ProtocolError> {
    Ok(serde_json::from_str(frame)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
