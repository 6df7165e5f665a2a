//! Explicit per-client game state.
//!
//! A [`ClientSession`] is owned by the client's top-level loop.  Every
//! handler consumes the session and returns the next one, so a handler is a
//! plain `(state, event) -> state` function that can be unit tested without
//! any network or clock.
//!
//! # Two kinds of transitions
//!
//! - **Remote** – [`ClientSession::apply`] replays a [`ServerMessage`] from a
//!   peer (through the relay).
//! - **Local** – the player's own actions.  Actions peers must see return the
//!   events to send alongside the new state; purely local ones (checking,
//!   clearing, timer ticks) return only the state.
//!
//! ```text
//!             local action                    ServerMessage
//!   player ──────────────▶ ClientSession ◀─────────────── relay
//!                              │
//!                              └── Vec<ClientMessage> ───▶ relay
//! ```
//!
//! Times are passed in explicitly as Unix epoch milliseconds.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::game::actions;
use crate::game::board::{BoardStyling, CellStyle, Fill, PlayerBoard};
use crate::game::navigation::{next_square, previous_square_in_word, Cursor};
use crate::game::timer::Timer;
use crate::protocol::messages::{CellInput, ClientMessage, PlayerMove, ServerMessage, TimerSync, WordReveal};
use crate::protocol::slot::{PlayerState, PlayerStates, Slot};
use crate::puzzle::model::{Direction, Position, Puzzle};

/// One client's view of a co-solving game.
#[derive(Debug, Clone)]
pub struct ClientSession {
    puzzle: Arc<Puzzle>,
    board: PlayerBoard,
    styling: BoardStyling,
    timer: Timer,
    slot: Option<Slot>,
    peers: PlayerStates,
    cursor: Cursor,
    won: bool,
}

impl ClientSession {
    /// Starts a session on an empty board with the cursor on the first input
    /// square, moving horizontally.
    pub fn new(puzzle: Arc<Puzzle>) -> Self {
        let start = puzzle
            .positions()
            .find(|&p| puzzle.square(p).is_some_and(|sq| sq.is_input))
            .unwrap_or_default();
        Self {
            board: PlayerBoard::new_for(&puzzle),
            styling: BoardStyling::new_for(&puzzle),
            puzzle,
            timer: Timer::new(),
            slot: None,
            peers: PlayerStates::default(),
            cursor: Cursor {
                square: start,
                direction: Direction::Horizontal,
            },
            won: false,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn board(&self) -> &PlayerBoard {
        &self.board
    }

    pub fn styling(&self) -> &BoardStyling {
        &self.styling
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Slot assigned by the relay, once known.
    pub fn slot(&self) -> Option<Slot> {
        self.slot
    }

    /// Cursor states of the other participants.
    pub fn peers(&self) -> &PlayerStates {
        &self.peers
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn has_won(&self) -> bool {
        self.won
    }

    /// Index of the clue under the cursor, in the cursor's direction.
    pub fn active_clue(&self) -> usize {
        self.puzzle
            .clue_index_at(self.cursor.square, self.cursor.direction)
            .unwrap_or(0)
    }

    /// This client's own cursor as peers see it.
    pub fn player_state(&self) -> PlayerState {
        PlayerState {
            active_square: self.cursor.square,
            active_clue: self.active_clue(),
            is_horizontal: self.cursor.direction.is_horizontal(),
            is_active: true,
        }
    }

    // ── Remote events ─────────────────────────────────────────────────────────

    /// Replays one relay event.
    pub fn apply(mut self, msg: ServerMessage, now_ms: u64) -> Self {
        match msg {
            ServerMessage::GetPlayerNumber(slot) => {
                debug!("assigned slot {slot}");
                self.slot = Some(slot);
                self
            }
            ServerMessage::PlayerMove(PlayerMove {
                player_number,
                player_state,
            }) => {
                if Some(player_number) != self.slot {
                    self.peers.apply_move(player_number, player_state);
                }
                self
            }
            ServerMessage::Input(input) => {
                let pos = input.position();
                if !self.puzzle.square(pos).is_some_and(|sq| sq.is_input) {
                    warn!("ignoring peer input at {pos}: not an input square");
                    return self;
                }
                self.board.set(pos, Fill::from_wire(&input.value));
                self.styling.set(pos, CellStyle::Default);
                self.timer.adopt_peer_start(input.timer.start);
                self.after_board_change(now_ms)
            }
            ServerMessage::RevealWord(reveal) => {
                actions::reveal_word(
                    &self.puzzle,
                    &mut self.board,
                    &mut self.styling,
                    reveal.position(),
                    reveal.direction(),
                    CellStyle::RevealedByPeer,
                );
                self.after_board_change(now_ms)
            }
            ServerMessage::RevealGrid(from) => {
                debug!("{from} revealed the grid");
                actions::reveal_grid(
                    &self.puzzle,
                    &mut self.board,
                    &mut self.styling,
                    CellStyle::RevealedByPeer,
                );
                self.after_board_change(now_ms)
            }
            ServerMessage::PlayerDisconnect(vacated) => {
                self.peers.renumber_after(vacated);
                self.slot = self
                    .slot
                    .map(|mine| mine.after_departure(vacated).unwrap_or(mine));
                debug!("{vacated} left; now {:?}", self.slot);
                self
            }
            ServerMessage::SessionFull => {
                warn!("session is full; no slot assigned");
                self
            }
        }
    }

    // ── Local cursor actions ──────────────────────────────────────────────────

    /// Moves the cursor to `pos` if it is an input square.
    pub fn focus(mut self, pos: Position) -> (Self, Vec<ClientMessage>) {
        if !self.is_input(pos) || pos == self.cursor.square {
            return (self, Vec::new());
        }
        self.cursor.square = pos;
        let moved = self.move_message();
        (self, vec![moved])
    }

    /// A click on the active square toggles direction; elsewhere it focuses.
    pub fn click_square(mut self, pos: Position) -> (Self, Vec<ClientMessage>) {
        if pos != self.cursor.square {
            return self.focus(pos);
        }
        self.cursor.direction = self.cursor.direction.toggled();
        let moved = self.move_message();
        (self, vec![moved])
    }

    /// Jumps to the first square of clue `index` in `direction`.
    pub fn select_clue(mut self, direction: Direction, index: usize) -> (Self, Vec<ClientMessage>) {
        let Some(clue) = self.puzzle.clues(direction).get(index) else {
            return (self, Vec::new());
        };
        self.cursor = Cursor {
            square: clue.first_square,
            direction,
        };
        let moved = self.move_message();
        (self, vec![moved])
    }

    // ── Local board actions ───────────────────────────────────────────────────

    /// Types `letter` at the cursor, then autotypes to the next square.
    ///
    /// Emits `input` followed by `playerMove`.  Non-alphabetic characters are
    /// ignored.
    pub fn type_letter(mut self, letter: char, now_ms: u64) -> (Self, Vec<ClientMessage>) {
        if !letter.is_ascii_alphabetic() {
            return (self, Vec::new());
        }
        let pos = self.cursor.square;
        let fill = Fill::Letter(letter.to_ascii_uppercase());
        if !self.board.set(pos, fill) {
            return (self, Vec::new());
        }
        self.styling.set(pos, CellStyle::Default);
        self.timer.start(now_ms);

        let input = self.input_message(pos, fill);
        self.cursor.square = next_square(&self.puzzle, &self.board, self.cursor);
        let moved = self.move_message();
        (self.after_board_change(now_ms), vec![input, moved])
    }

    /// Clears the cursor square, or steps back within the word and clears
    /// that square when the cursor square is already empty.
    pub fn backspace(mut self) -> (Self, Vec<ClientMessage>) {
        let here = self.cursor.square;
        if !self.board.is_empty_at(here) {
            if !self.board.set(here, Fill::Empty) {
                return (self, Vec::new());
            }
            self.styling.set(here, CellStyle::Default);
            let input = self.input_message(here, Fill::Empty);
            return (self, vec![input]);
        }

        let Some(prev) = previous_square_in_word(&self.puzzle, here, self.cursor.direction) else {
            return (self, Vec::new());
        };
        self.board.set(prev, Fill::Empty);
        self.styling.set(prev, CellStyle::Default);
        self.cursor.square = prev;
        let input = self.input_message(prev, Fill::Empty);
        let moved = self.move_message();
        (self, vec![input, moved])
    }

    /// Reveals the cursor square.  Peers receive it as an ordinary `input`.
    pub fn reveal_letter(mut self, now_ms: u64) -> (Self, Vec<ClientMessage>) {
        let pos = self.cursor.square;
        actions::reveal_letter(
            &self.puzzle,
            &mut self.board,
            &mut self.styling,
            pos,
            CellStyle::RevealedByMe,
        );
        let messages = match self.board.get(pos) {
            Some(fill @ Fill::Letter(_)) => vec![self.input_message(pos, fill)],
            _ => Vec::new(),
        };
        (self.after_board_change(now_ms), messages)
    }

    /// Reveals the word under the cursor.
    pub fn reveal_word(mut self, now_ms: u64) -> (Self, Vec<ClientMessage>) {
        let Cursor { square, direction } = self.cursor;
        actions::reveal_word(
            &self.puzzle,
            &mut self.board,
            &mut self.styling,
            square,
            direction,
            CellStyle::RevealedByMe,
        );
        let msg = ClientMessage::RevealWord(WordReveal {
            row: square.row,
            col: square.col,
            is_horizontal: direction.is_horizontal(),
        });
        (self.after_board_change(now_ms), vec![msg])
    }

    pub fn reveal_grid(mut self, now_ms: u64) -> (Self, Vec<ClientMessage>) {
        actions::reveal_grid(
            &self.puzzle,
            &mut self.board,
            &mut self.styling,
            CellStyle::RevealedByMe,
        );
        let msg = ClientMessage::RevealGrid(self.slot.unwrap_or(Slot::Player1));
        (self.after_board_change(now_ms), vec![msg])
    }

    pub fn check_letter(mut self) -> Self {
        actions::check_letter(&self.puzzle, &self.board, &mut self.styling, self.cursor.square);
        self
    }

    pub fn check_word(mut self) -> Self {
        let Cursor { square, direction } = self.cursor;
        actions::check_word(&self.puzzle, &self.board, &mut self.styling, square, direction);
        self
    }

    pub fn check_grid(mut self) -> Self {
        actions::check_grid(&self.puzzle, &self.board, &mut self.styling);
        self
    }

    /// Clears this player's board and timer.  Not shared with peers.
    pub fn clear_board(mut self) -> Self {
        actions::clear_board(&mut self.board, &mut self.styling);
        self.timer.reset();
        self.won = false;
        self
    }

    /// Per-second timer update.
    pub fn tick(mut self, now_ms: u64) -> Self {
        self.timer.tick(now_ms);
        self
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn is_input(&self, pos: Position) -> bool {
        self.puzzle.square(pos).is_some_and(|sq| sq.is_input)
    }

    fn move_message(&self) -> ClientMessage {
        ClientMessage::PlayerMove(PlayerMove {
            player_number: self.slot.unwrap_or(Slot::Player1),
            player_state: self.player_state(),
        })
    }

    fn input_message(&self, pos: Position, fill: Fill) -> ClientMessage {
        ClientMessage::Input(CellInput {
            row: pos.row,
            col: pos.col,
            value: fill.to_wire(),
            timer: TimerSync {
                start: self.timer.start_ms(),
            },
        })
    }

    fn after_board_change(mut self, now_ms: u64) -> Self {
        if !self.won && self.board.is_solved(&self.puzzle) {
            self.won = true;
            self.timer.stop(now_ms);
            info!("puzzle {} solved in {}", self.puzzle.id, self.timer.elapsed());
        }
        self
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::derive::derive;

    fn puzzle() -> Arc<Puzzle> {
        let (board, h_clues, v_clues) = derive(
            &["ABC", "D#F", "GHI"],
            &["h1", "h2", "h3", "h4"],
            &["v1", "v2", "v3", "v4"],
        )
        .unwrap();
        Arc::new(Puzzle {
            id: "111".into(),
            title: "Test Crossword".into(),
            author: "Alicia Tran".into(),
            board,
            h_clues,
            v_clues,
        })
    }

    fn input(row: usize, col: usize, value: &str, start: Option<u64>) -> ServerMessage {
        ServerMessage::Input(CellInput {
            row,
            col,
            value: value.to_string(),
            timer: TimerSync { start },
        })
    }

    #[test]
    fn test_new_session_starts_at_first_input_square() {
        let session = ClientSession::new(puzzle());
        assert_eq!(session.cursor().square, Position::new(0, 0));
        assert_eq!(session.slot(), None);
        assert!(!session.has_won());
    }

    #[test]
    fn test_get_player_number_sets_slot() {
        let session = ClientSession::new(puzzle()).apply(ServerMessage::GetPlayerNumber(Slot::Player2), 0);
        assert_eq!(session.slot(), Some(Slot::Player2));
    }

    #[test]
    fn test_type_letter_writes_uppercase_and_advances() {
        // Arrange
        let session = ClientSession::new(puzzle());

        // Act
        let (session, out) = session.type_letter('a', 1_000);

        // Assert
        assert_eq!(session.board().get(Position::new(0, 0)), Some(Fill::Letter('A')));
        assert_eq!(session.cursor().square, Position::new(0, 1));
        assert_eq!(session.timer().start_ms(), Some(1_000));
        assert_eq!(out.len(), 2);
        assert!(matches!(&out[0], ClientMessage::Input(i) if i.value == "A" && i.timer.start == Some(1_000)));
        assert!(matches!(&out[1], ClientMessage::PlayerMove(m) if m.player_state.active_square == Position::new(0, 1)));
    }

    #[test]
    fn test_type_non_letter_is_ignored() {
        let (session, out) = ClientSession::new(puzzle()).type_letter('7', 0);
        assert!(out.is_empty());
        assert!(session.board().is_empty_at(Position::new(0, 0)));
    }

    #[test]
    fn test_type_letter_resets_incorrect_style() {
        let (session, _) = ClientSession::new(puzzle()).type_letter('Z', 0);
        let session = session.check_grid();
        assert_eq!(session.styling().get(Position::new(0, 0)), Some(CellStyle::Incorrect));
        let (session, _) = session.select_clue(Direction::Horizontal, 0);
        let (session, _) = session.type_letter('A', 0);
        assert_eq!(session.styling().get(Position::new(0, 0)), Some(CellStyle::Default));
    }

    #[test]
    fn test_click_same_square_toggles_direction() {
        let session = ClientSession::new(puzzle());
        let (session, out) = session.click_square(Position::new(0, 0));
        assert_eq!(session.cursor().direction, Direction::Vertical);
        assert!(matches!(&out[0], ClientMessage::PlayerMove(m) if !m.player_state.is_horizontal));
    }

    #[test]
    fn test_click_other_square_focuses_it() {
        let (session, _) = ClientSession::new(puzzle()).click_square(Position::new(2, 1));
        assert_eq!(session.cursor().square, Position::new(2, 1));
        assert_eq!(session.cursor().direction, Direction::Horizontal);
    }

    #[test]
    fn test_focus_on_block_is_ignored() {
        let (session, out) = ClientSession::new(puzzle()).focus(Position::new(1, 1));
        assert!(out.is_empty());
        assert_eq!(session.cursor().square, Position::new(0, 0));
    }

    #[test]
    fn test_select_clue_moves_to_first_square() {
        let (session, _) = ClientSession::new(puzzle()).select_clue(Direction::Vertical, 3);
        assert_eq!(session.cursor().square, Position::new(2, 1));
        assert_eq!(session.active_clue(), 3);
    }

    #[test]
    fn test_backspace_on_empty_square_steps_back_and_clears() {
        // Arrange – type A, B so the cursor rests on (0,2)
        let session = ClientSession::new(puzzle());
        let (session, _) = session.type_letter('A', 0);
        let (session, _) = session.type_letter('B', 0);
        assert_eq!(session.cursor().square, Position::new(0, 2));

        // Act
        let (session, out) = session.backspace();

        // Assert
        assert_eq!(session.cursor().square, Position::new(0, 1));
        assert!(session.board().is_empty_at(Position::new(0, 1)));
        assert!(matches!(&out[0], ClientMessage::Input(i) if i.value.is_empty() && i.col == 1));
    }

    #[test]
    fn test_backspace_at_word_start_does_nothing() {
        let (session, out) = ClientSession::new(puzzle()).backspace();
        assert!(out.is_empty());
        assert_eq!(session.cursor().square, Position::new(0, 0));
    }

    #[test]
    fn test_backspace_on_filled_square_clears_in_place() {
        let (session, _) = ClientSession::new(puzzle()).select_clue(Direction::Horizontal, 1);
        let (session, _) = session.type_letter('D', 0);
        let (session, _) = session.select_clue(Direction::Horizontal, 1);
        let (session, out) = session.backspace();
        assert_eq!(session.cursor().square, Position::new(1, 0));
        assert!(session.board().is_empty_at(Position::new(1, 0)));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_peer_input_writes_cell_and_resets_style() {
        // Arrange
        let (session, _) = ClientSession::new(puzzle()).type_letter('Q', 0);
        let session = session.check_letter();

        // Act – a peer overwrites (0,0)
        let session = session.apply(input(0, 0, "A", Some(5)), 0);

        // Assert
        assert_eq!(session.board().get(Position::new(0, 0)), Some(Fill::Letter('A')));
        assert_eq!(session.styling().get(Position::new(0, 0)), Some(CellStyle::Default));
    }

    #[test]
    fn test_peer_input_adopts_timer_only_when_unstarted() {
        let session = ClientSession::new(puzzle()).apply(input(0, 0, "A", Some(42)), 0);
        assert_eq!(session.timer().start_ms(), Some(42));
        let session = session.apply(input(0, 1, "B", Some(7)), 0);
        assert_eq!(session.timer().start_ms(), Some(42));
    }

    #[test]
    fn test_peer_input_out_of_bounds_is_ignored() {
        let before = ClientSession::new(puzzle());
        let after = before.clone().apply(input(9, 9, "A", None), 0);
        assert_eq!(after.board(), before.board());
    }

    #[test]
    fn test_peer_move_activates_peer_slot() {
        let session = ClientSession::new(puzzle()).apply(ServerMessage::GetPlayerNumber(Slot::Player1), 0);
        let session = session.apply(
            ServerMessage::PlayerMove(PlayerMove {
                player_number: Slot::Player2,
                player_state: PlayerState {
                    active_square: Position::new(2, 2),
                    ..PlayerState::default()
                },
            }),
            0,
        );
        assert!(session.peers().get(Slot::Player2).is_active);
        assert_eq!(session.peers().get(Slot::Player2).active_square, Position::new(2, 2));
    }

    #[test]
    fn test_peer_reveal_word_uses_peer_style() {
        let session = ClientSession::new(puzzle()).apply(
            ServerMessage::RevealWord(WordReveal {
                row: 2,
                col: 0,
                is_horizontal: true,
            }),
            0,
        );
        assert_eq!(session.board().get(Position::new(2, 2)), Some(Fill::Letter('I')));
        assert_eq!(session.styling().get(Position::new(2, 2)), Some(CellStyle::RevealedByPeer));
    }

    #[test]
    fn test_peer_reveal_grid_wins_and_stops_timer() {
        let session = ClientSession::new(puzzle()).apply(input(0, 0, "A", Some(1_000)), 1_000);
        let session = session.apply(ServerMessage::RevealGrid(Slot::Player2), 4_000);
        assert!(session.has_won());
        assert!(!session.timer().is_running());
        assert_eq!(session.timer().elapsed().secs, 3);
    }

    #[test]
    fn test_player_disconnect_decrements_higher_own_slot() {
        let session = ClientSession::new(puzzle()).apply(ServerMessage::GetPlayerNumber(Slot::Player3), 0);
        let session = session.apply(ServerMessage::PlayerDisconnect(Slot::Player1), 0);
        assert_eq!(session.slot(), Some(Slot::Player2));
    }

    #[test]
    fn test_player_disconnect_keeps_lower_own_slot() {
        let session = ClientSession::new(puzzle()).apply(ServerMessage::GetPlayerNumber(Slot::Player1), 0);
        let session = session.apply(ServerMessage::PlayerDisconnect(Slot::Player2), 0);
        assert_eq!(session.slot(), Some(Slot::Player1));
    }

    #[test]
    fn test_local_reveal_word_emits_event_and_uses_my_style() {
        let (session, out) = ClientSession::new(puzzle()).reveal_word(0);
        assert_eq!(session.styling().get(Position::new(0, 1)), Some(CellStyle::RevealedByMe));
        assert_eq!(
            out,
            vec![ClientMessage::RevealWord(WordReveal {
                row: 0,
                col: 0,
                is_horizontal: true
            })]
        );
    }

    #[test]
    fn test_local_reveal_letter_emits_input() {
        let (session, out) = ClientSession::new(puzzle()).reveal_letter(0);
        assert_eq!(session.board().get(Position::new(0, 0)), Some(Fill::Letter('A')));
        assert!(matches!(&out[0], ClientMessage::Input(i) if i.value == "A"));
    }

    #[test]
    fn test_local_reveal_grid_emits_own_slot() {
        let session = ClientSession::new(puzzle()).apply(ServerMessage::GetPlayerNumber(Slot::Player2), 0);
        let (session, out) = session.reveal_grid(0);
        assert!(session.has_won());
        assert_eq!(out, vec![ClientMessage::RevealGrid(Slot::Player2)]);
    }

    #[test]
    fn test_clear_board_resets_won_flag_and_timer() {
        let (session, _) = ClientSession::new(puzzle()).type_letter('A', 5);
        let (session, _) = session.reveal_grid(10);
        let session = session.clear_board();
        assert!(!session.has_won());
        assert!(session.board().is_empty_at(Position::new(0, 0)));
        assert_eq!(session.timer().start_ms(), None);
    }

    #[test]
    fn test_tick_updates_elapsed() {
        let (session, _) = ClientSession::new(puzzle()).type_letter('A', 0);
        let session = session.tick(61_000);
        assert_eq!(session.timer().elapsed().mins, 1);
    }
}
