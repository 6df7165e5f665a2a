//! Player fill state and per-cell styling.
//!
//! On the wire a cell of the player board is a string: `""` (empty), `"#"`
//! (block), or a single uppercase letter.  [`Fill`] is the typed form.

use serde::{Deserialize, Serialize};

use crate::puzzle::model::{Position, Puzzle, BLOCK};

// ── Fill ──────────────────────────────────────────────────────────────────────

/// Contents of one cell of a player's board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fill {
    #[default]
    Empty,
    Block,
    Letter(char),
}

impl Fill {
    /// Parses a wire value.  Only the first character is kept and letters are
    /// upper-cased; `""` is [`Fill::Empty`].
    pub fn from_wire(value: &str) -> Self {
        match value.chars().next() {
            None => Self::Empty,
            Some(BLOCK) => Self::Block,
            Some(c) => Self::Letter(c.to_ascii_uppercase()),
        }
    }

    pub fn to_wire(self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Block => BLOCK.to_string(),
            Self::Letter(c) => c.to_string(),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }

    /// The character this fill compares against a solution square.
    fn as_char(self) -> Option<char> {
        match self {
            Self::Empty => None,
            Self::Block => Some(BLOCK),
            Self::Letter(c) => Some(c),
        }
    }
}

// ── PlayerBoard ───────────────────────────────────────────────────────────────

/// One player's fill state.  Dimensions match the puzzle and never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerBoard {
    cells: Vec<Vec<Fill>>,
}

impl PlayerBoard {
    /// Creates an empty board for `puzzle` with blocks pre-filled.
    pub fn new_for(puzzle: &Puzzle) -> Self {
        let cells = puzzle
            .board
            .iter()
            .map(|row| {
                row.iter()
                    .map(|sq| if sq.is_input { Fill::Empty } else { Fill::Block })
                    .collect()
            })
            .collect();
        Self { cells }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn get(&self, pos: Position) -> Option<Fill> {
        self.cells.get(pos.row).and_then(|row| row.get(pos.col)).copied()
    }

    /// `true` only for an in-bounds empty input cell.
    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos).is_some_and(Fill::is_empty)
    }

    /// Writes `fill` into an input cell.
    ///
    /// Returns `false` (and changes nothing) when `pos` is out of bounds, is a
    /// block, or `fill` is [`Fill::Block`].
    pub fn set(&mut self, pos: Position, fill: Fill) -> bool {
        match self.cells.get_mut(pos.row).and_then(|row| row.get_mut(pos.col)) {
            Some(cell) if *cell != Fill::Block && fill != Fill::Block => {
                *cell = fill;
                true
            }
            _ => false,
        }
    }

    /// Empties every input cell.
    pub fn clear(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            if *cell != Fill::Block {
                *cell = Fill::Empty;
            }
        }
    }

    /// `true` when every cell equals the solution (blocks match blocks).
    pub fn is_solved(&self, puzzle: &Puzzle) -> bool {
        self.rows() == puzzle.rows()
            && self.cells.iter().zip(&puzzle.board).all(|(mine, solution)| {
                mine.len() == solution.len()
                    && mine
                        .iter()
                        .zip(solution)
                        .all(|(fill, sq)| fill.as_char() == Some(sq.value))
            })
    }

    /// Wire form: one string per cell.
    pub fn to_wire(&self) -> Vec<Vec<String>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|f| f.to_wire()).collect())
            .collect()
    }
}

// ── Styling ───────────────────────────────────────────────────────────────────

/// Render state of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellStyle {
    #[default]
    #[serde(rename = "black")]
    Default,
    /// Marked wrong by a check action.
    #[serde(rename = "red")]
    Incorrect,
    /// Revealed by this player.
    #[serde(rename = "green")]
    RevealedByMe,
    /// Revealed by a peer.
    #[serde(rename = "gray")]
    RevealedByPeer,
}

/// Per-cell [`CellStyle`] grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardStyling {
    cells: Vec<Vec<CellStyle>>,
}

impl BoardStyling {
    pub fn new_for(puzzle: &Puzzle) -> Self {
        Self {
            cells: vec![vec![CellStyle::Default; puzzle.cols()]; puzzle.rows()],
        }
    }

    pub fn get(&self, pos: Position) -> Option<CellStyle> {
        self.cells.get(pos.row).and_then(|row| row.get(pos.col)).copied()
    }

    /// Returns `false` when `pos` is out of bounds.
    pub fn set(&mut self, pos: Position, style: CellStyle) -> bool {
        match self.cells.get_mut(pos.row).and_then(|row| row.get_mut(pos.col)) {
            Some(cell) => {
                *cell = style;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            *cell = CellStyle::Default;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
