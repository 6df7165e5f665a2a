//! Session membership and slot assignment.
//!
//! # Connection lifecycle
//!
//! ```text
//!             connect()            join() → Joined           disconnect()
//!   (none) ─────────────▶ Connecting ───────────────▶ Joined ─────────────▶ Disconnected
//!                             │                                                ▲
//!                             └── join() → Full ── disconnect() ───────────────┘
//! ```
//!
//! Each session keeps its members in join order and a member's slot is its
//! position in that list.  Removing a member therefore closes the gap on its
//! own: every later member moves down one slot, which is exactly the
//! renumbering clients apply when they receive `playerDisconnect`.
//!
//! Sessions are keyed by [`SessionId`] and never share members, which is what
//! keeps fan-out isolated per session.  A session is dropped as soon as its
//! last member leaves.

use std::collections::HashMap;

use thiserror::Error;
use xword_core::protocol::slot::SLOT_COUNT;
use xword_core::Slot;

use crate::domain::ids::{ConnectionId, SessionId};

/// Largest number of members a session can hold.
pub const MAX_MEMBERS: usize = SLOT_COUNT;

/// Misuse of the registry by the connection layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{0} was never registered")]
    UnknownConnection(ConnectionId),

    #[error("{0} already joined session {1}")]
    AlreadyJoined(ConnectionId, SessionId),
}

/// Observable state of one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Accepted, handshake in progress or slot not yet assigned.
    Connecting,
    /// Holds `slot` in `session`.
    Joined { session: SessionId, slot: Slot },
    /// Gone, or never seen.
    Disconnected,
}

/// Result of [`SessionRegistry::join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The connection now holds `slot`; `peers` are the members that were
    /// already present.
    Joined { slot: Slot, peers: Vec<ConnectionId> },
    /// All three slots are taken; the connection stays unjoined.
    Full,
}

/// Result of a joined connection leaving its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub session: SessionId,
    /// Slot the departing connection held.
    pub vacated: Slot,
    /// Members whose slot moved down, with their new slot.
    pub renumbered: Vec<(ConnectionId, Slot)>,
    /// Members still in the session, in slot order.
    pub remaining: Vec<ConnectionId>,
}

/// All sessions and the connections in them.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// `None` while connecting.
    connections: HashMap<ConnectionId, Option<SessionId>>,
    /// Members in slot order.
    sessions: HashMap<SessionId, Vec<ConnectionId>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly accepted connection as `Connecting`.
    pub fn connect(&mut self, conn: ConnectionId) {
        self.connections.entry(conn).or_insert(None);
    }

    /// Assigns `conn` the next free slot in `session`.
    ///
    /// The slot is the number of members already present.  A fourth joiner
    /// gets [`JoinOutcome::Full`] and is left in `Connecting`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::UnknownConnection`] if `conn` was not registered
    ///   with [`connect`](Self::connect).
    /// - [`RegistryError::AlreadyJoined`] if `conn` is already a member.
    pub fn join(&mut self, conn: ConnectionId, session: SessionId) -> Result<JoinOutcome, RegistryError> {
        let entry = self
            .connections
            .get_mut(&conn)
            .ok_or(RegistryError::UnknownConnection(conn))?;
        if let Some(existing) = entry {
            return Err(RegistryError::AlreadyJoined(conn, existing.clone()));
        }

        let members = self.sessions.entry(session.clone()).or_default();
        let Some(slot) = Slot::from_index(members.len()) else {
            return Ok(JoinOutcome::Full);
        };
        let peers = members.clone();
        members.push(conn);
        *entry = Some(session);
        Ok(JoinOutcome::Joined { slot, peers })
    }

    /// Removes `conn` from the registry.
    ///
    /// Returns the departure details when `conn` held a slot; `None` when it
    /// never joined (including connections turned away as full).
    pub fn disconnect(&mut self, conn: ConnectionId) -> Option<LeaveOutcome> {
        let session = self.connections.remove(&conn).flatten()?;
        let members = self.sessions.get_mut(&session)?;
        let index = members.iter().position(|&m| m == conn)?;
        members.remove(index);

        let vacated = Slot::from_index(index)?;
        let renumbered = members
            .iter()
            .enumerate()
            .skip(index)
            .filter_map(|(i, &m)| Slot::from_index(i).map(|slot| (m, slot)))
            .collect();
        let remaining = members.clone();
        if remaining.is_empty() {
            self.sessions.remove(&session);
        }

        Some(LeaveOutcome {
            session,
            vacated,
            renumbered,
            remaining,
        })
    }

    pub fn state(&self, conn: ConnectionId) -> ConnectionState {
        match self.connections.get(&conn) {
            None => ConnectionState::Disconnected,
            Some(None) => ConnectionState::Connecting,
            Some(Some(session)) => match self.slot_in(session, conn) {
                Some(slot) => ConnectionState::Joined {
                    session: session.clone(),
                    slot,
                },
                None => ConnectionState::Connecting,
            },
        }
    }

    /// Current slot of `conn`, if joined.
    pub fn slot_of(&self, conn: ConnectionId) -> Option<Slot> {
        let session = self.connections.get(&conn)?.as_ref()?;
        self.slot_in(session, conn)
    }

    pub fn session_of(&self, conn: ConnectionId) -> Option<&SessionId> {
        self.connections.get(&conn)?.as_ref()
    }

    /// Members of `session` in slot order.
    pub fn members(&self, session: &SessionId) -> &[ConnectionId] {
        self.sessions.get(session).map_or(&[], Vec::as_slice)
    }

    /// Members of `conn`'s session other than `conn` itself.
    pub fn peers_of(&self, conn: ConnectionId) -> Vec<ConnectionId> {
        self.session_of(conn)
            .map(|s| self.members(s).iter().copied().filter(|&m| m != conn).collect())
            .unwrap_or_default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn slot_in(&self, session: &SessionId, conn: ConnectionId) -> Option<Slot> {
        self.members(session)
            .iter()
            .position(|&m| m == conn)
            .and_then(Slot::from_index)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
