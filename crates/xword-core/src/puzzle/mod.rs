//! Puzzle data: the read-only crossword shared by every player in a session.
//!
//! # Sub-modules
//!
//! - **`model`** – Square, clue, and puzzle types with the JSON shape served
//!   to clients.
//! - **`parser`** – Converts the upstream fixed-layout text feed into a
//!   [`model::Puzzle`].
//! - **`derive`** – The pure clue-numbering pass that annotates every square
//!   with its horizontal and vertical clue index, plus word-boundary lookup.
//! - **`feed`** – Upstream feed addressing (date query) and game identifiers.

pub mod derive;
pub mod feed;
pub mod model;
pub mod parser;
