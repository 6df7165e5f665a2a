//! Reveal, check, and clear actions on a player's board.
//!
//! A reveal writes the solution letter and styles the cell with the given
//! reveal style ([`CellStyle::RevealedByMe`] locally,
//! [`CellStyle::RevealedByPeer`] when replaying a peer's reveal).  A check
//! styles every non-empty wrong cell as [`CellStyle::Incorrect`] and leaves
//! other cells alone.

use crate::game::board::{BoardStyling, CellStyle, Fill, PlayerBoard};
use crate::puzzle::derive::word_cells;
use crate::puzzle::model::{Direction, Position, Puzzle};

/// Reveals the solution for `cells`.  Blocks and out-of-bounds cells are skipped.
fn reveal_cells(
    puzzle: &Puzzle,
    board: &mut PlayerBoard,
    styling: &mut BoardStyling,
    cells: impl IntoIterator<Item = Position>,
    style: CellStyle,
) {
    for pos in cells {
        if let Some(sq) = puzzle.square(pos).filter(|sq| sq.is_input) {
            board.set(pos, Fill::Letter(sq.value));
            styling.set(pos, style);
        }
    }
}

fn check_cells(
    puzzle: &Puzzle,
    board: &PlayerBoard,
    styling: &mut BoardStyling,
    cells: impl IntoIterator<Item = Position>,
) {
    for pos in cells {
        let (Some(sq), Some(Fill::Letter(c))) = (puzzle.square(pos), board.get(pos)) else {
            continue;
        };
        if c != sq.value {
            styling.set(pos, CellStyle::Incorrect);
        }
    }
}

pub fn reveal_letter(
    puzzle: &Puzzle,
    board: &mut PlayerBoard,
    styling: &mut BoardStyling,
    pos: Position,
    style: CellStyle,
) {
    reveal_cells(puzzle, board, styling, [pos], style);
}

/// Reveals the word through `pos` in `direction`.
pub fn reveal_word(
    puzzle: &Puzzle,
    board: &mut PlayerBoard,
    styling: &mut BoardStyling,
    pos: Position,
    direction: Direction,
    style: CellStyle,
) {
    let cells = word_cells(&puzzle.board, pos, direction);
    reveal_cells(puzzle, board, styling, cells, style);
}

pub fn reveal_grid(
    puzzle: &Puzzle,
    board: &mut PlayerBoard,
    styling: &mut BoardStyling,
    style: CellStyle,
) {
    reveal_cells(puzzle, board, styling, puzzle.positions(), style);
}

pub fn check_letter(puzzle: &Puzzle, board: &PlayerBoard, styling: &mut BoardStyling, pos: Position) {
    check_cells(puzzle, board, styling, [pos]);
}

pub fn check_word(
    puzzle: &Puzzle,
    board: &PlayerBoard,
    styling: &mut BoardStyling,
    pos: Position,
    direction: Direction,
) {
    let cells = word_cells(&puzzle.board, pos, direction);
    check_cells(puzzle, board, styling, cells);
}

pub fn check_grid(puzzle: &Puzzle, board: &PlayerBoard, styling: &mut BoardStyling) {
    check_cells(puzzle, board, styling, puzzle.positions());
}

/// Empties every input cell and resets all styling.
pub fn clear_board(board: &mut PlayerBoard, styling: &mut BoardStyling) {
    board.clear();
    styling.reset();
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::derive::derive;

    fn setup() -> (Puzzle, PlayerBoard, BoardStyling) {
        let (board, h_clues, v_clues) = derive(
            &["ABC", "D#F", "GHI"],
            &["h1", "h2", "h3", "h4"],
            &["v1", "v2", "v3", "v4"],
        )
        .unwrap();
        let puzzle = Puzzle {
            id: "111".into(),
            title: String::new(),
            author: String::new(),
            board,
            h_clues,
            v_clues,
        };
        let board = PlayerBoard::new_for(&puzzle);
        let styling = BoardStyling::new_for(&puzzle);
        (puzzle, board, styling)
    }

    #[test]
    fn test_reveal_letter_writes_solution_and_style() {
        // Arrange
        let (p, mut board, mut styling) = setup();
        let pos = Position::new(2, 1);

        // Act
        reveal_letter(&p, &mut board, &mut styling, pos, CellStyle::RevealedByMe);

        // Assert
        assert_eq!(board.get(pos), Some(Fill::Letter('H')));
        assert_eq!(styling.get(pos), Some(CellStyle::RevealedByMe));
    }

    #[test]
    fn test_reveal_letter_on_block_is_noop() {
        let (p, mut board, mut styling) = setup();
        reveal_letter(&p, &mut board, &mut styling, Position::new(1, 1), CellStyle::RevealedByMe);
        assert_eq!(board.get(Position::new(1, 1)), Some(Fill::Block));
        assert_eq!(styling.get(Position::new(1, 1)), Some(CellStyle::Default));
    }

    #[test]
    fn test_reveal_word_vertical_covers_full_column_word() {
        // Arrange
        let (p, mut board, mut styling) = setup();

        // Act – column 2 is one vertical word C/F/I
        reveal_word(
            &p,
            &mut board,
            &mut styling,
            Position::new(1, 2),
            Direction::Vertical,
            CellStyle::RevealedByPeer,
        );

        // Assert
        assert_eq!(board.get(Position::new(0, 2)), Some(Fill::Letter('C')));
        assert_eq!(board.get(Position::new(1, 2)), Some(Fill::Letter('F')));
        assert_eq!(board.get(Position::new(2, 2)), Some(Fill::Letter('I')));
        assert_eq!(board.get(Position::new(0, 1)), Some(Fill::Empty));
        assert_eq!(styling.get(Position::new(2, 2)), Some(CellStyle::RevealedByPeer));
    }

    #[test]
    fn test_reveal_grid_solves_board() {
        let (p, mut board, mut styling) = setup();
        reveal_grid(&p, &mut board, &mut styling, CellStyle::RevealedByMe);
        assert!(board.is_solved(&p));
    }

    #[test]
    fn test_check_grid_marks_only_wrong_non_empty_cells() {
        // Arrange
        let (p, mut board, mut styling) = setup();
        board.set(Position::new(0, 0), Fill::Letter('A'));
        board.set(Position::new(0, 1), Fill::Letter('X'));

        // Act
        check_grid(&p, &board, &mut styling);

        // Assert
        assert_eq!(styling.get(Position::new(0, 0)), Some(CellStyle::Default));
        assert_eq!(styling.get(Position::new(0, 1)), Some(CellStyle::Incorrect));
        assert_eq!(styling.get(Position::new(0, 2)), Some(CellStyle::Default));
    }

    #[test]
    fn test_check_word_limits_to_word() {
        let (p, mut board, mut styling) = setup();
        board.set(Position::new(2, 0), Fill::Letter('Z'));
        board.set(Position::new(0, 2), Fill::Letter('Z'));
        check_word(&p, &board, &mut styling, Position::new(2, 1), Direction::Horizontal);
        assert_eq!(styling.get(Position::new(2, 0)), Some(CellStyle::Incorrect));
        assert_eq!(styling.get(Position::new(0, 2)), Some(CellStyle::Default));
    }

    #[test]
    fn test_check_letter_single_cell() {
        let (p, mut board, mut styling) = setup();
        board.set(Position::new(1, 0), Fill::Letter('Q'));
        check_letter(&p, &board, &mut styling, Position::new(1, 0));
        assert_eq!(styling.get(Position::new(1, 0)), Some(CellStyle::Incorrect));
    }

    #[test]
    fn test_clear_board_resets_fill_and_style() {
        let (p, mut board, mut styling) = setup();
        reveal_grid(&p, &mut board, &mut styling, CellStyle::RevealedByMe);
        clear_board(&mut board, &mut styling);
        assert_eq!(board, PlayerBoard::new_for(&p));
        assert_eq!(styling, BoardStyling::new_for(&p));
    }
}
