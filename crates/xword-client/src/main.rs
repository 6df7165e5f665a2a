//! Headless crossword co-solver: entry point.
//!
//! Loads a puzzle, joins a relay session and keeps a local board in sync with
//! the other players.  With `--autosolve-ms` it also fills in one correct
//! letter per interval, which makes it a handy sparring partner or load
//! generator for the relay.
//!
//! # Usage
//!
//! ```text
//! xword-client [OPTIONS]
//!
//! Options:
//!   --relay <HOST:PORT>        Relay address [default: 127.0.0.1:3000]
//!   --session <ID>             Session to join; a fresh id is issued if omitted
//!   --puzzle-file <PATH>       Read the puzzle from a feed blob or JSON file
//!   --feed-base <URL>          Upstream feed endpoint (ignored with --puzzle-file)
//!   --date <YYYY-MM-DD>        Feed date [default: today]
//!   --autosolve-ms <MS>        Type one correct letter every MS milliseconds
//!   --exit-on-win              Leave the session once the board is solved
//!   --tick-ms <MS>             Timer refresh period [default: 1000]
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use xword_client::application::{load_puzzle, run_client, ClientOptions};
use xword_client::infrastructure::{FileFeedSource, HttpFeedSource, PuzzleSource, RelayConnection};
use xword_core::{GameId, DEFAULT_FEED_BASE};

// ── CLI argument definitions ──────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "xword-client", about = "Headless crossword co-solver", version)]
struct Cli {
    /// Relay address, `host:port` or a `ws://` URL.
    #[arg(long, default_value = "127.0.0.1:3000", env = "XWORD_RELAY")]
    relay: String,

    /// Session id to join.  Share it with the other players.
    #[arg(long, env = "XWORD_SESSION")]
    session: Option<String>,

    /// Puzzle file: a raw feed blob or a `{"crosswordData": ...}` document.
    #[arg(long, conflicts_with = "feed_base")]
    puzzle_file: Option<PathBuf>,

    /// Upstream daily feed endpoint.
    #[arg(long, default_value = DEFAULT_FEED_BASE, env = "XWORD_FEED_BASE")]
    feed_base: String,

    /// Feed date; defaults to today in the local time zone.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Autosolve period in milliseconds.
    #[arg(long)]
    autosolve_ms: Option<u64>,

    /// Exit once the puzzle is solved.
    #[arg(long)]
    exit_on_win: bool,

    /// Timer refresh period in milliseconds.
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,
}

impl Cli {
    fn puzzle_source(&self) -> anyhow::Result<Box<dyn PuzzleSource>> {
        if let Some(path) = &self.puzzle_file {
            return Ok(Box::new(FileFeedSource::new(path)));
        }
        let mut source = HttpFeedSource::new(&self.feed_base).context("failed to build HTTP client")?;
        if let Some(date) = self.date {
            source = source.with_date(date.into());
        }
        Ok(Box::new(source))
    }

    /// Session to join, issuing a fresh one when none was given.
    fn session_id(&self) -> String {
        match &self.session {
            Some(id) => id.clone(),
            None => GameId::new().as_str().to_string(),
        }
    }

    fn client_options(&self) -> anyhow::Result<ClientOptions> {
        if self.tick_ms == 0 {
            anyhow::bail!("--tick-ms must be greater than zero");
        }
        if self.autosolve_ms == Some(0) {
            anyhow::bail!("--autosolve-ms must be greater than zero");
        }
        Ok(ClientOptions {
            tick: Duration::from_millis(self.tick_ms),
            autosolve_every: self.autosolve_ms.map(Duration::from_millis),
            exit_on_win: self.exit_on_win,
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let options = cli.client_options()?;
    let session_id = cli.session_id();
    if cli.session.is_none() {
        info!("issued new session id {session_id}; pass --session {session_id} to other players");
    }

    let source = cli.puzzle_source()?;
    let puzzle = load_puzzle(source.as_ref()).await.context("failed to load puzzle")?;

    let mut conn = RelayConnection::connect(&cli.relay, &session_id)
        .await
        .context("failed to join relay session")?;

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, leaving session");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    let session = run_client(puzzle, &conn.outbound, &mut conn.inbound, &options, running)
        .await
        .context("client loop failed")?;

    info!(
        "left session {session_id} as {} (solved: {}, time {})",
        session.slot().map_or_else(|| "unassigned".to_string(), |s| s.to_string()),
        session.has_won(),
        session.timer().elapsed()
    );
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
