//! Elapsed solving time.
//!
//! The timer starts on the first letter typed locally, or adopts the start
//! time carried by the first peer `input` event when it has not started yet
//! (first input wins).  A periodic `tick` recomputes the elapsed time; the
//! timer stops when the puzzle is solved.

use std::fmt;

/// Elapsed time split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Elapsed {
    pub hours: u64,
    pub mins: u64,
    pub secs: u64,
}

impl Elapsed {
    pub fn from_millis(ms: u64) -> Self {
        let total = ms / 1000;
        Self {
            hours: total / 3600,
            mins: (total % 3600) / 60,
            secs: total % 60,
        }
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}:{:02}", self.hours, self.mins, self.secs)
    }
}

/// Solving timer.  Times are Unix epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timer {
    start_ms: Option<u64>,
    elapsed: Elapsed,
    stopped: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_ms(&self) -> Option<u64> {
        self.start_ms
    }

    pub fn elapsed(&self) -> Elapsed {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.start_ms.is_some() && !self.stopped
    }

    /// Starts the timer at `now_ms` unless it has already started.
    pub fn start(&mut self, now_ms: u64) {
        if self.start_ms.is_none() && !self.stopped {
            self.start_ms = Some(now_ms);
        }
    }

    /// Adopts a peer's start time if this timer has not started.
    ///
    /// Returns `true` when the peer start was adopted.
    pub fn adopt_peer_start(&mut self, start_ms: Option<u64>) -> bool {
        match start_ms {
            Some(start) if self.start_ms.is_none() && !self.stopped => {
                self.start_ms = Some(start);
                true
            }
            _ => false,
        }
    }

    /// Recomputes the elapsed time; no-op unless running.
    pub fn tick(&mut self, now_ms: u64) {
        if let (Some(start), false) = (self.start_ms, self.stopped) {
            self.elapsed = Elapsed::from_millis(now_ms.saturating_sub(start));
        }
    }

    /// Freezes the elapsed time.  A stopped timer never restarts.
    pub fn stop(&mut self, now_ms: u64) {
        self.tick(now_ms);
        self.stopped = true;
    }

    /// Resets to the unstarted state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
