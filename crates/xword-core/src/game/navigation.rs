//! Autotype navigation: choosing the square to focus after a letter is typed.
//!
//! # Horizontal vs vertical (for beginners)
//!
//! Horizontal words lie along rows, so reading the grid row by row visits
//! every horizontal word in order.  The horizontal scan is therefore a plain
//! linear walk: step right, wrap to the start of the next row at the end of a
//! row, and wrap from the last row back to the first.  Blocks never need
//! special handling because a player's board holds `#` there, which is never
//! empty.
//!
//! Vertical words do not line up in any single scanning order, so the
//! vertical scan walks down the current column and, at the bottom of the grid
//! or at a block, jumps to the first square of the next vertical clue:
//!
//! ```text
//!   col 0   col 1   col 2
//!    1 ↓     2 ↓     3 ↓        after the bottom of clue 1's column,
//!    4 ↓     #       5 ↓        continue at clue 2's first square,
//!    6 ↓     7 ↓     .          then clue 3, then 7, then wrap to 1.
//! ```
//!
//! # Termination
//!
//! Both scans stop at the first empty square, or return the starting square
//! unchanged once the scan comes back to it (the board is full).  Every step
//! is also counted against a hard cap, so a scan can never loop forever and
//! never produces an out-of-bounds position, whatever the board contents.

use crate::game::board::PlayerBoard;
use crate::puzzle::model::{Direction, Position, Puzzle};

/// A player's cursor: active square plus typing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub square: Position,
    pub direction: Direction,
}

/// Next square after typing at `cursor`, in the cursor's direction.
pub fn next_square(puzzle: &Puzzle, board: &PlayerBoard, cursor: Cursor) -> Position {
    match cursor.direction {
        Direction::Horizontal => next_horizontal_square(board, cursor.square),
        Direction::Vertical => next_vertical_square(puzzle, board, cursor.square),
    }
}

/// Next empty square scanning right with row wrap-around.
///
/// Returns `from` when no other square is empty or `from` is out of bounds.
pub fn next_horizontal_square(board: &PlayerBoard, from: Position) -> Position {
    let (rows, cols) = (board.rows(), board.cols());
    if from.row >= rows || from.col >= cols {
        return from;
    }

    let mut cur = from;
    for _ in 0..rows * cols {
        cur = if cur.col + 1 == cols {
            Position::new((cur.row + 1) % rows, 0)
        } else {
            Position::new(cur.row, cur.col + 1)
        };

        if cur == from {
            break;
        }
        if board.is_empty_at(cur) {
            return cur;
        }
    }
    from
}

/// Next empty square scanning down the column, jumping between vertical
/// clues in clue order.
///
/// Returns `from` when no other square is empty, `from` is not an input
/// square, or the puzzle has no vertical clues.
pub fn next_vertical_square(puzzle: &Puzzle, board: &PlayerBoard, from: Position) -> Position {
    let clues = &puzzle.v_clues;
    let Some(mut clue) = puzzle.clue_index_at(from, Direction::Vertical) else {
        return from;
    };
    if clues.is_empty() {
        return from;
    }

    let rows = puzzle.rows();
    let cap = rows * puzzle.cols() + clues.len() + 1;
    let mut cur = from;

    for _ in 0..cap {
        let below = Position::new(cur.row + 1, cur.col);
        let below_is_input = below.row < rows && puzzle.square(below).is_some_and(|sq| sq.is_input);

        cur = if below_is_input {
            below
        } else {
            clue = (clue + 1) % clues.len();
            clues[clue].first_square
        };

        if cur == from {
            break;
        }
        if board.is_empty_at(cur) {
            return cur;
        }
    }
    from
}

/// The square before `from` within its word, if any.
///
/// Used by backspace: returns `None` at the first square of the word.
pub fn previous_square_in_word(puzzle: &Puzzle, from: Position, direction: Direction) -> Option<Position> {
    let prev = match direction {
        Direction::Horizontal => Position::new(from.row, from.col.checked_sub(1)?),
        Direction::Vertical => Position::new(from.row.checked_sub(1)?, from.col),
    };
    puzzle.square(prev).filter(|sq| sq.is_input).map(|_| prev)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
