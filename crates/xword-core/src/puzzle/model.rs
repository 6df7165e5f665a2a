//! Puzzle domain entities.
//!
//! A [`Puzzle`] is immutable once parsed.  Its JSON form is what clients
//! receive from the puzzle fetch endpoint, so the serde attributes here pin
//! the wire shape:
//!
//! ```text
//! { "value": "A", "isInput": true, "isStart": true,
//!   "clueNum": 1, "hClueNum": 0, "vClueNum": 0 }
//! { "value": "#", "isInput": false, "isStart": false,
//!   "clueNum": "", "hClueNum": -1, "vClueNum": -1 }
//! ```
//!
//! In Rust the "empty" and "-1" sentinels become `Option::None`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Character used for block (non-playable) cells.
pub const BLOCK: char = '#';

// ── Position / Direction ──────────────────────────────────────────────────────

/// A zero-based `(row, col)` grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Word direction.  On the wire this is the `isHorizontal` boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Horizontal,
    Vertical,
}

impl Direction {
    pub fn from_is_horizontal(is_horizontal: bool) -> Self {
        if is_horizontal {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }

    pub fn is_horizontal(self) -> bool {
        self == Self::Horizontal
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => f.write_str("horizontal"),
            Self::Vertical => f.write_str("vertical"),
        }
    }
}

// ── Square / Clue ─────────────────────────────────────────────────────────────

/// One cell of the solution grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Square {
    /// Solution letter, or [`BLOCK`].
    pub value: char,
    pub is_input: bool,
    /// Begins a horizontal and/or vertical word.
    pub is_start: bool,
    /// Displayed clue number; only start cells carry one.
    #[serde(with = "clue_num_or_empty")]
    pub clue_num: Option<u32>,
    /// Index into [`Puzzle::h_clues`]; `None` only for blocks.
    #[serde(rename = "hClueNum", with = "index_or_sentinel")]
    pub h_clue: Option<usize>,
    /// Index into [`Puzzle::v_clues`]; `None` only for blocks.
    #[serde(rename = "vClueNum", with = "index_or_sentinel")]
    pub v_clue: Option<usize>,
}

impl Square {
    /// A non-playable block cell.
    pub fn block() -> Self {
        Self {
            value: BLOCK,
            is_input: false,
            is_start: false,
            clue_num: None,
            h_clue: None,
            v_clue: None,
        }
    }

    pub fn is_block(&self) -> bool {
        !self.is_input
    }

    /// Clue index for the word running in `direction` through this cell.
    pub fn clue_index(&self, direction: Direction) -> Option<usize> {
        match direction {
            Direction::Horizontal => self.h_clue,
            Direction::Vertical => self.v_clue,
        }
    }
}

/// A clue in either the horizontal or the vertical list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clue {
    pub clue_num: u32,
    pub clue_text: String,
    /// Start cell of the word this clue describes.
    pub first_square: Position,
}

// ── Puzzle ────────────────────────────────────────────────────────────────────

/// A parsed crossword.  Dimensions are fixed at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    pub id: String,
    pub title: String,
    pub author: String,
    pub board: Vec<Vec<Square>>,
    pub h_clues: Vec<Clue>,
    pub v_clues: Vec<Clue>,
}

impl Puzzle {
    pub fn rows(&self) -> usize {
        self.board.len()
    }

    pub fn cols(&self) -> usize {
        self.board.first().map_or(0, Vec::len)
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows() && pos.col < self.cols()
    }

    /// Returns the square at `pos`, or `None` when out of bounds.
    pub fn square(&self, pos: Position) -> Option<&Square> {
        self.board.get(pos.row).and_then(|row| row.get(pos.col))
    }

    /// Returns the clue list for `direction`.
    pub fn clues(&self, direction: Direction) -> &[Clue] {
        match direction {
            Direction::Horizontal => &self.h_clues,
            Direction::Vertical => &self.v_clues,
        }
    }

    /// Returns the index of the clue whose word covers `pos` in `direction`.
    pub fn clue_index_at(&self, pos: Position, direction: Direction) -> Option<usize> {
        self.square(pos).and_then(|sq| sq.clue_index(direction))
    }

    /// Iterates over every grid position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let cols = self.cols();
        (0..self.rows()).flat_map(move |row| (0..cols).map(move |col| Position::new(row, col)))
    }
}

/// Envelope returned by the puzzle fetch endpoint: `{ "crosswordData": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosswordResponse {
    pub crossword_data: Puzzle,
}

// ── Serde helpers ─────────────────────────────────────────────────────────────

/// `Some(n)` ⇄ `n`, `None` ⇄ `""`.
mod clue_num_or_empty {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u32>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(n) => s.serialize_u32(*n),
            None => s.serialize_str(""),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Number(n) => Ok(Some(n)),
            Raw::Text(t) if t.is_empty() => Ok(None),
            Raw::Text(t) => Err(de::Error::custom(format!(
                "expected a clue number or \"\", got {t:?}"
            ))),
        }
    }
}

/// `Some(i)` ⇄ `i`, `None` ⇄ `-1`.
mod index_or_sentinel {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<usize>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(i) => s.serialize_u64(*i as u64),
            None => s.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<usize>, D::Error> {
        match i64::deserialize(d)? {
            -1 => Ok(None),
            i if i >= 0 => Ok(Some(i as usize)),
            i => Err(de::Error::custom(format!("invalid clue index {i}"))),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
