//! Player slots and per-slot cursor state.
//!
//! Every session has exactly three slots.  Slots are assigned in join order
//! and stay compact: when a lower slot leaves, every higher slot moves down
//! by one so that the occupied slots are always `player1..playerN`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::puzzle::model::{Direction, Position};

/// Number of slots in a session.
pub const SLOT_COUNT: usize = 3;

/// One of the three fixed participant identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    #[serde(rename = "player1")]
    Player1,
    #[serde(rename = "player2")]
    Player2,
    #[serde(rename = "player3")]
    Player3,
}

impl Slot {
    pub const ALL: [Slot; SLOT_COUNT] = [Slot::Player1, Slot::Player2, Slot::Player3];

    /// Slot for a zero-based index, e.g. the number of members already present.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            Slot::Player1 => 0,
            Slot::Player2 => 1,
            Slot::Player3 => 2,
        }
    }

    /// The slot one below, or `None` for `player1`.
    pub fn next_lower(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// This slot's label after `vacated` leaves the session.
    ///
    /// Higher slots move down by one; lower slots are unchanged.  Returns
    /// `None` when `self` is the vacated slot.
    pub fn after_departure(self, vacated: Slot) -> Option<Self> {
        match self.cmp(&vacated) {
            std::cmp::Ordering::Less => Some(self),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => self.next_lower(),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player{}", self.index() + 1)
    }
}

// ── PlayerState ───────────────────────────────────────────────────────────────

/// A participant's cursor as seen by the other participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub active_square: Position,
    /// Index into the clue list selected by `is_horizontal`.
    pub active_clue: usize,
    pub is_horizontal: bool,
    /// `false` when the slot is unassigned or its holder left.
    pub is_active: bool,
}

impl PlayerState {
    pub fn direction(&self) -> Direction {
        Direction::from_is_horizontal(self.is_horizontal)
    }
}

/// State of all three slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerStates {
    states: [PlayerState; SLOT_COUNT],
}

impl PlayerStates {
    pub fn get(&self, slot: Slot) -> &PlayerState {
        &self.states[slot.index()]
    }

    /// Records a peer move.  The slot becomes active.
    pub fn apply_move(&mut self, slot: Slot, state: PlayerState) {
        self.states[slot.index()] = PlayerState {
            is_active: true,
            ..state
        };
    }

    pub fn deactivate(&mut self, slot: Slot) {
        self.states[slot.index()].is_active = false;
    }

    /// Closes the gap left by `vacated`: higher slots shift down by one and
    /// the top slot becomes inactive.
    pub fn renumber_after(&mut self, vacated: Slot) {
        let from = vacated.index();
        self.states.copy_within(from + 1.., from);
        self.states[SLOT_COUNT - 1] = PlayerState::default();
    }

    /// Slots currently marked active.
    pub fn active_slots(&self) -> impl Iterator<Item = Slot> + '_ {
        Slot::ALL.into_iter().filter(|s| self.get(*s).is_active)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
