//! Session and connection identifiers.
//!
//! A [`SessionId`] is the opaque string the client put in the `?session=`
//! query parameter of its WebSocket URL; clients obtain it from
//! `xword_core::GameId::new()`.  Only URL-unreserved characters are accepted,
//! so the raw query text is the id and no percent-decoding takes place.  The
//! relay never interprets it beyond using it as the fan-out key.
//!
//! A [`ConnectionId`] names one accepted socket for the lifetime of the
//! process.  Ids come from a [`ConnectionCounter`], a lock-free `AtomicU64`
//! that every accept-loop iteration can bump without coordination.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use xword_core::GameId;

/// Query-string key carrying the session id.
pub const SESSION_QUERY_KEY: &str = "session";

// ── SessionId ─────────────────────────────────────────────────────────────────

/// Opaque game-session key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a raw id.
    ///
    /// Returns `None` for an empty id or one containing anything besides
    /// `A-Z a-z 0-9 - . _ ~` (percent escapes included).
    pub fn parse(raw: &str) -> Option<Self> {
        GameId::is_well_formed(raw).then(|| Self(raw.to_string()))
    }

    /// Extracts the session id from a request query string such as
    /// `session=abc&v=2`.
    ///
    /// Returns `None` when the query is absent, has no `session` key, or the
    /// value is not a well-formed id.  The first `session` key wins.
    pub fn from_query(query: Option<&str>) -> Option<Self> {
        query?
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == SESSION_QUERY_KEY)
            .and_then(|(_, value)| Self::parse(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── ConnectionId ──────────────────────────────────────────────────────────────

/// Process-unique id of one accepted socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Thread-safe allocator of [`ConnectionId`]s.
///
/// Ids start at 1 and increase by one per call.
#[derive(Debug)]
pub struct ConnectionCounter {
    next: AtomicU64,
}

impl ConnectionCounter {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocates the next id.
    ///
    /// `Relaxed` is enough: ids only need to be unique, not ordered with
    /// respect to other memory operations.
    pub fn next(&self) -> ConnectionId {
        ConnectionId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next.load(Ordering::Relaxed) - 1
    }
}

impl Default for ConnectionCounter {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_session_id_from_query_reads_session_key() {
        // Arrange / Act
        let id = SessionId::from_query(Some("session=4f1c9a&theme=dark"));

        // Assert
        assert_eq!(id.unwrap().as_str(), "4f1c9a");
    }

    #[test]
    fn test_session_id_from_query_missing_key_is_none() {
        assert_eq!(SessionId::from_query(Some("room=1")), None);
        assert_eq!(SessionId::from_query(None), None);
    }

    #[test]
    fn test_session_id_from_query_empty_value_is_none() {
        assert_eq!(SessionId::from_query(Some("session=")), None);
        assert_eq!(SessionId::from_query(Some("session=   ")), None);
    }

    #[test]
    fn test_session_id_rejects_percent_escapes_and_spaces() {
        // `a%20b` and `a b` must not name two different sessions.
        assert_eq!(SessionId::from_query(Some("session=a%20b")), None);
        assert_eq!(SessionId::from_query(Some("session=a b")), None);
        assert_eq!(SessionId::parse("a/b"), None);
    }

    #[test]
    fn test_session_id_accepts_issued_game_ids() {
        let issued = GameId::new();
        let id = SessionId::from_query(Some(&format!("session={issued}"))).unwrap();
        assert_eq!(id.as_str(), issued.as_str());
    }

    #[test]
    fn test_session_id_first_key_wins() {
        let id = SessionId::from_query(Some("session=a&session=b")).unwrap();
        assert_eq!(id.to_string(), "a");
    }

    #[test]
    fn test_connection_counter_starts_at_one() {
        let counter = ConnectionCounter::new();
        assert_eq!(counter.next(), ConnectionId::new(1));
        assert_eq!(counter.next(), ConnectionId::new(2));
        assert_eq!(counter.allocated(), 2);
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(7).to_string(), "conn-7");
    }

    #[test]
    fn test_connection_counter_is_unique_across_threads() {
        // Arrange
        let counter = Arc::new(ConnectionCounter::new());
        let threads = 8;
        let per_thread = 1_000;

        // Act
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || (0..per_thread).map(|_| counter.next()).collect::<Vec<_>>())
            })
            .collect();
        let all: HashSet<ConnectionId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        // Assert
        assert_eq!(all.len(), threads * per_thread);
    }
}
