//! Parser for the upstream fixed-layout puzzle feed.
//!
//! # Feed layout
//!
//! The feed is a plain-text blob.  Every field sits at a fixed line offset
//! because the format separates fields with exactly one blank line:
//!
//! ```text
//! line  0   header marker
//! line  2   id
//! line  4   title
//! line  6   author
//! line  8   rows
//! line 10   cols
//! line 12   number of horizontal clues
//! line 14   number of vertical clues
//! line 16…  `rows` grid lines, blocks as '#', circled squares marked '%'
//! then      one blank line, `numH` horizontal clue lines
//! then      one blank line, `numV` vertical clue lines
//! ```
//!
//! Circle markers (`%`) are stripped and not modelled.  Windows line endings
//! are tolerated.

use thiserror::Error;
use tracing::debug;

use super::derive::derive;
use super::model::{Direction, Puzzle};

const ID_LINE: usize = 2;
const TITLE_LINE: usize = 4;
const AUTHOR_LINE: usize = 6;
const ROWS_LINE: usize = 8;
const COLS_LINE: usize = 10;
const NUM_H_LINE: usize = 12;
const NUM_V_LINE: usize = 14;
const GRID_START_LINE: usize = 16;

/// Marker the feed uses for circled squares.
const CIRCLE_MARKER: char = '%';

/// Errors produced while parsing a feed blob.
///
/// Callers treat every variant as an upstream-data failure; nothing here is
/// retried automatically.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    /// The blob ended before a fixed-offset field.
    #[error("feed is missing line {line} ({what})")]
    MissingLine { line: usize, what: &'static str },

    /// A count field was not a non-negative integer.
    #[error("invalid {what} in feed: {value:?}")]
    InvalidCount { what: &'static str, value: String },

    /// The puzzle id line was blank.
    #[error("feed header field {what} is empty")]
    EmptyHeaderField { what: &'static str },

    /// The grid has no cells.
    #[error("feed grid is empty")]
    EmptyGrid,

    /// A grid line's length disagrees with the declared column count.
    #[error("grid row {row} has {actual} cells, expected {expected}")]
    GridWidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Fewer clue texts than start cells in a direction.
    #[error("missing {direction} clue text at index {index}")]
    MissingClueText { direction: Direction, index: usize },

    /// More clue texts than start cells in a direction.
    #[error("grid has {expected} {direction} clues but the feed lists {actual}")]
    ClueCountMismatch {
        direction: Direction,
        expected: usize,
        actual: usize,
    },
}

/// Fixed header fields of a feed blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleHeader {
    pub id: String,
    pub title: String,
    pub author: String,
    pub rows: usize,
    pub cols: usize,
    pub num_h_clues: usize,
    pub num_v_clues: usize,
}

/// Parses a complete feed blob into a [`Puzzle`].
///
/// # Errors
///
/// Returns a [`ParseError`] describing the first malformed field.
pub fn parse_feed(blob: &str) -> Result<Puzzle, ParseError> {
    let lines: Vec<&str> = blob
        .split('\n')
        .map(|l| l.trim_end_matches('\r'))
        .collect();

    let header = parse_header(&lines)?;
    debug!(
        "parsing puzzle {} ({}x{}, {} across, {} down)",
        header.id, header.rows, header.cols, header.num_h_clues, header.num_v_clues
    );

    if header.rows == 0 || header.cols == 0 {
        return Err(ParseError::EmptyGrid);
    }

    let grid = (0..header.rows)
        .map(|r| {
            let raw = line(&lines, GRID_START_LINE + r, "grid row")?;
            let row: String = raw.trim().chars().filter(|&c| c != CIRCLE_MARKER).collect();
            let width = row.chars().count();
            if width != header.cols {
                return Err(ParseError::GridWidthMismatch {
                    row: r,
                    expected: header.cols,
                    actual: width,
                });
            }
            Ok(row)
        })
        .collect::<Result<Vec<String>, ParseError>>()?;

    let h_start = GRID_START_LINE + 1 + header.rows;
    let v_start = h_start + 1 + header.num_h_clues;
    let h_texts = clue_texts(&lines, h_start, header.num_h_clues, Direction::Horizontal)?;
    let v_texts = clue_texts(&lines, v_start, header.num_v_clues, Direction::Vertical)?;

    let (board, h_clues, v_clues) = derive(&grid, &h_texts, &v_texts)?;

    Ok(Puzzle {
        id: header.id,
        title: header.title,
        author: header.author,
        board,
        h_clues,
        v_clues,
    })
}

/// Reads the fixed header fields from already-split lines.
///
/// # Errors
///
/// Returns [`ParseError::MissingLine`], [`ParseError::EmptyHeaderField`] or
/// [`ParseError::InvalidCount`].
pub fn parse_header(lines: &[&str]) -> Result<PuzzleHeader, ParseError> {
    let id = line(lines, ID_LINE, "id")?.trim();
    if id.is_empty() {
        return Err(ParseError::EmptyHeaderField { what: "id" });
    }

    Ok(PuzzleHeader {
        id: id.to_string(),
        title: line(lines, TITLE_LINE, "title")?.trim().to_string(),
        author: line(lines, AUTHOR_LINE, "author")?.trim().to_string(),
        rows: count(lines, ROWS_LINE, "row count")?,
        cols: count(lines, COLS_LINE, "column count")?,
        num_h_clues: count(lines, NUM_H_LINE, "horizontal clue count")?,
        num_v_clues: count(lines, NUM_V_LINE, "vertical clue count")?,
    })
}

fn line<'a>(lines: &[&'a str], index: usize, what: &'static str) -> Result<&'a str, ParseError> {
    lines
        .get(index)
        .copied()
        .ok_or(ParseError::MissingLine { line: index, what })
}

fn count(lines: &[&str], index: usize, what: &'static str) -> Result<usize, ParseError> {
    let raw = line(lines, index, what)?.trim();
    raw.parse().map_err(|_| ParseError::InvalidCount {
        what,
        value: raw.to_string(),
    })
}

fn clue_texts(
    lines: &[&str],
    start: usize,
    n: usize,
    direction: Direction,
) -> Result<Vec<String>, ParseError> {
    (0..n)
        .map(|index| {
            lines
                .get(start + index)
                .map(|l| l.trim().to_string())
                .ok_or(ParseError::MissingClueText { direction, index })
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
