//! Autosolve bot: one correct letter per step.
//!
//! Picks the first input square in row-major order whose fill differs from
//! the solution, moves the cursor there if needed and types the solution
//! letter.  Squares a peer already filled correctly are skipped, so several
//! bots in one session converge without typing over each other's work.

use xword_core::{ClientMessage, ClientSession, Fill, Position};

/// The next square the bot would fix, with its solution letter.
pub fn next_target(session: &ClientSession) -> Option<(Position, char)> {
    let puzzle = session.puzzle();
    puzzle.positions().find_map(|pos| {
        let square = puzzle.square(pos)?;
        if !square.is_input {
            return None;
        }
        match session.board().get(pos)? {
            Fill::Letter(c) if c == square.value => None,
            _ => Some((pos, square.value)),
        }
    })
}

/// Performs one bot step.  Returns the events to send; empty when the board
/// is already correct.
pub fn step(session: ClientSession, now_ms: u64) -> (ClientSession, Vec<ClientMessage>) {
    let Some((target, letter)) = next_target(&session) else {
        return (session, Vec::new());
    };
    let (session, mut outbox) = session.focus(target);
    let (session, typed) = session.type_letter(letter, now_ms);
    outbox.extend(typed);
    (session, outbox)
}
