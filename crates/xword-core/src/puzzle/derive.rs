//! Board/clue derivation: the clue-numbering pass.
//!
//! [`derive`] is a pure function of the raw grid and the two clue-text lists.
//! It scans the grid row-major and, for every input cell, decides whether the
//! cell starts a horizontal word (first column, or block to the left) and/or a
//! vertical word (first row, or block above).
//!
//! ```text
//!  A B C        1 2 3        h: 0 0 0     v: 0 1 2
//!  D # F   ──▶  4 # 5        h: 1 - 2     v: 0 - 2
//!  G H I        6 7 .        h: 3 3 3     v: 0 3 2
//! ```
//!
//! A start cell takes the next clue number once, even if it starts words in
//! both directions.  A non-start cell inherits the clue index of its left
//! neighbour (horizontal) and of the cell above it (vertical); both
//! neighbours were annotated earlier in the same row-major scan.

use super::model::{Clue, Direction, Position, Square, BLOCK};
use super::parser::ParseError;

/// Output of [`derive`]: `(board, h_clues, v_clues)`.
pub type Derived = (Vec<Vec<Square>>, Vec<Clue>, Vec<Clue>);

/// Builds the annotated board and both clue lists.
///
/// `raw_grid` holds one string per row, blocks written as `#`.  Letters are
/// upper-cased.
///
/// # Errors
///
/// - [`ParseError::EmptyGrid`] when there are no rows or the first row is empty.
/// - [`ParseError::GridWidthMismatch`] when rows have different lengths.
/// - [`ParseError::MissingClueText`] when the grid has more start cells in a
///   direction than clue texts were supplied.
/// - [`ParseError::ClueCountMismatch`] when texts are left over.
pub fn derive<S: AsRef<str>>(
    raw_grid: &[S],
    h_texts: &[S],
    v_texts: &[S],
) -> Result<Derived, ParseError> {
    let grid: Vec<Vec<char>> = raw_grid
        .iter()
        .map(|row| row.as_ref().chars().collect())
        .collect();

    let cols = grid.first().map_or(0, Vec::len);
    if cols == 0 {
        return Err(ParseError::EmptyGrid);
    }
    for (row, cells) in grid.iter().enumerate() {
        if cells.len() != cols {
            return Err(ParseError::GridWidthMismatch {
                row,
                expected: cols,
                actual: cells.len(),
            });
        }
    }

    let mut board: Vec<Vec<Square>> = Vec::with_capacity(grid.len());
    let mut h_clues = Vec::new();
    let mut v_clues = Vec::new();
    let mut clue_num = 0u32;

    for (r, cells) in grid.iter().enumerate() {
        let mut row: Vec<Square> = Vec::with_capacity(cols);

        for (c, &ch) in cells.iter().enumerate() {
            if ch == BLOCK {
                row.push(Square::block());
                continue;
            }

            let is_h_start = c == 0 || cells[c - 1] == BLOCK;
            let is_v_start = r == 0 || grid[r - 1][c] == BLOCK;
            let pos = Position::new(r, c);

            let mut square_num = None;
            if is_h_start || is_v_start {
                clue_num += 1;
                square_num = Some(clue_num);
            }

            let h_clue = if is_h_start {
                Some(push_clue(&mut h_clues, h_texts, Direction::Horizontal, clue_num, pos)?)
            } else {
                row[c - 1].h_clue
            };
            let v_clue = if is_v_start {
                Some(push_clue(&mut v_clues, v_texts, Direction::Vertical, clue_num, pos)?)
            } else {
                board[r - 1][c].v_clue
            };

            row.push(Square {
                value: ch.to_ascii_uppercase(),
                is_input: true,
                is_start: square_num.is_some(),
                clue_num: square_num,
                h_clue,
                v_clue,
            });
        }

        board.push(row);
    }

    check_all_used(Direction::Horizontal, h_clues.len(), h_texts.len())?;
    check_all_used(Direction::Vertical, v_clues.len(), v_texts.len())?;

    Ok((board, h_clues, v_clues))
}

/// Appends the next clue of `direction`, consuming the next unread text.
fn push_clue<S: AsRef<str>>(
    clues: &mut Vec<Clue>,
    texts: &[S],
    direction: Direction,
    clue_num: u32,
    first_square: Position,
) -> Result<usize, ParseError> {
    let index = clues.len();
    let text = texts
        .get(index)
        .ok_or(ParseError::MissingClueText { direction, index })?;
    clues.push(Clue {
        clue_num,
        clue_text: text.as_ref().to_string(),
        first_square,
    });
    Ok(index)
}

fn check_all_used(direction: Direction, expected: usize, actual: usize) -> Result<(), ParseError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ParseError::ClueCountMismatch {
            direction,
            expected,
            actual,
        })
    }
}

/// Returns the cells of the word running through `pos` in `direction`.
///
/// The word is the maximal run of input cells containing `pos`.  Returns an
/// empty list for blocks and out-of-bounds positions.
pub fn word_cells(board: &[Vec<Square>], pos: Position, direction: Direction) -> Vec<Position> {
    let is_input = |p: Position| {
        board
            .get(p.row)
            .and_then(|row| row.get(p.col))
            .is_some_and(|sq| sq.is_input)
    };
    if !is_input(pos) {
        return Vec::new();
    }

    let step_back = |p: Position| match direction {
        Direction::Horizontal => p.col.checked_sub(1).map(|col| Position::new(p.row, col)),
        Direction::Vertical => p.row.checked_sub(1).map(|row| Position::new(row, p.col)),
    };
    let step_forward = |p: Position| match direction {
        Direction::Horizontal => Position::new(p.row, p.col + 1),
        Direction::Vertical => Position::new(p.row + 1, p.col),
    };

    let mut start = pos;
    while let Some(prev) = step_back(start).filter(|&p| is_input(p)) {
        start = prev;
    }

    let mut cells = Vec::new();
    let mut cur = start;
    while is_input(cur) {
        cells.push(cur);
        cur = step_forward(cur);
    }
    cells
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: [&str; 3] = ["ABC", "D#F", "GHI"];
    const H: [&str; 4] = ["h1", "h2", "h3", "h4"];
    const V: [&str; 4] = ["v1", "v2", "v3", "v4"];

    #[test]
    fn test_derive_assigns_shared_clue_number_to_double_start() {
        // Act
        let (board, h, v) = derive(&GRID, &H, &V).unwrap();

        // Assert – (0,0) starts both words and uses number 1 in both lists
        assert_eq!(board[0][0].clue_num, Some(1));
        assert_eq!(h[0].clue_num, 1);
        assert_eq!(v[0].clue_num, 1);
    }

    #[test]
    fn test_derive_carries_indices_from_left_and_above() {
        let (board, _, _) = derive(&GRID, &H, &V).unwrap();
        let i = &board[2][2];
        assert!(!i.is_start);
        assert_eq!(i.clue_num, None);
        assert_eq!(i.h_clue, Some(3));
        assert_eq!(i.v_clue, Some(2));
    }

    #[test]
    fn test_derive_block_has_no_indices() {
        let (board, _, _) = derive(&GRID, &H, &V).unwrap();
        assert_eq!(board[1][1], Square::block());
    }

    #[test]
    fn test_derive_uppercases_letters() {
        let (board, _, _) = derive(&["ab"], &["h"], &["v1", "v2"]).unwrap();
        assert_eq!(board[0][0].value, 'A');
        assert_eq!(board[0][1].value, 'B');
    }

    #[test]
    fn test_derive_is_deterministic() {
        assert_eq!(derive(&GRID, &H, &V).unwrap(), derive(&GRID, &H, &V).unwrap());
    }

    #[test]
    fn test_derive_too_few_texts_is_missing_clue_text() {
        // Arrange – the grid needs four vertical clues
        let v = ["v1", "v2", "v3"];

        // Act
        let err = derive(&GRID, &H, &v).unwrap_err();

        // Assert
        assert_eq!(
            err,
            ParseError::MissingClueText {
                direction: Direction::Vertical,
                index: 3
            }
        );
    }

    #[test]
    fn test_derive_leftover_texts_is_count_mismatch() {
        let h = ["h1", "h2", "h3", "h4", "h5"];
        let err = derive(&GRID, &h, &V).unwrap_err();
        assert_eq!(
            err,
            ParseError::ClueCountMismatch {
                direction: Direction::Horizontal,
                expected: 4,
                actual: 5
            }
        );
    }

    #[test]
    fn test_derive_ragged_grid_is_width_mismatch() {
        let err = derive(&["ABC", "DE", "GHI"], &H, &V).unwrap_err();
        assert_eq!(
            err,
            ParseError::GridWidthMismatch {
                row: 1,
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_derive_empty_grid_is_error() {
        let empty: [&str; 0] = [];
        assert_eq!(derive(&empty, &empty, &empty).unwrap_err(), ParseError::EmptyGrid);
    }

    #[test]
    fn test_word_cells_horizontal_stops_at_block() {
        let (board, _, _) = derive(&GRID, &H, &V).unwrap();
        assert_eq!(
            word_cells(&board, Position::new(1, 0), Direction::Horizontal),
            vec![Position::new(1, 0)]
        );
        assert_eq!(
            word_cells(&board, Position::new(0, 1), Direction::Horizontal),
            vec![Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)]
        );
    }

    #[test]
    fn test_word_cells_vertical_uses_row_bound() {
        let (board, _, _) = derive(&GRID, &H, &V).unwrap();
        assert_eq!(
            word_cells(&board, Position::new(2, 2), Direction::Vertical),
            vec![Position::new(0, 2), Position::new(1, 2), Position::new(2, 2)]
        );
    }

    #[test]
    fn test_word_cells_block_is_empty() {
        let (board, _, _) = derive(&GRID, &H, &V).unwrap();
        assert!(word_cells(&board, Position::new(1, 1), Direction::Vertical).is_empty());
        assert!(word_cells(&board, Position::new(9, 9), Direction::Vertical).is_empty());
    }
}
