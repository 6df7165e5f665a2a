//! Where the puzzle comes from.
//!
//! Two sources implement [`PuzzleSource`]:
//!
//! - [`FileFeedSource`] reads a file from disk.  A file whose first
//!   non-blank character is `{` is read as the `{"crosswordData": ...}`
//!   envelope; anything else is parsed as a raw upstream feed blob.
//! - [`HttpFeedSource`] fetches today's puzzle from the upstream feed over
//!   HTTP(S) and parses the blob.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use xword_core::{feed_url, parse_feed, CrosswordResponse, FeedDate, ParseError, Puzzle};

/// Failures while obtaining a puzzle.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read puzzle file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The feed answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed feed: {0}")]
    Parse(#[from] ParseError),

    #[error("malformed puzzle JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Anything that can produce a [`Puzzle`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PuzzleSource: Send + Sync {
    async fn fetch(&self) -> Result<Puzzle, SourceError>;

    /// Human-readable origin for log lines.
    fn describe(&self) -> String;
}

/// Parses file contents as either a JSON envelope or a feed blob.
fn parse_puzzle_text(text: &str) -> Result<Puzzle, SourceError> {
    if text.trim_start().starts_with('{') {
        let envelope: CrosswordResponse = serde_json::from_str(text)?;
        Ok(envelope.crossword_data)
    } else {
        Ok(parse_feed(text)?)
    }
}

// ── File ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FileFeedSource {
    path: PathBuf,
}

impl FileFeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PuzzleSource for FileFeedSource {
    async fn fetch(&self) -> Result<Puzzle, SourceError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        debug!("read {} bytes from {}", text.len(), self.path.display());
        parse_puzzle_text(&text)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

// ── HTTP ──────────────────────────────────────────────────────────────────────

/// Upstream request timeout.
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetches the daily puzzle from the upstream feed.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: reqwest::Client,
    base: String,
    /// Fixed date; `None` means today in the local time zone.
    date: Option<FeedDate>,
}

impl HttpFeedSource {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(base: impl Into<String>) -> Result<Self, SourceError> {
        let base = base.into();
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|source| SourceError::Http {
                url: base.clone(),
                source,
            })?;
        Ok(Self {
            client,
            base,
            date: None,
        })
    }

    /// Pins the feed date instead of using today's.
    pub fn with_date(mut self, date: FeedDate) -> Self {
        self.date = Some(date);
        self
    }

    /// URL that [`fetch`](PuzzleSource::fetch) will request.
    pub fn url(&self) -> String {
        feed_url(&self.base, self.date.unwrap_or_else(FeedDate::today))
    }
}

#[async_trait]
impl PuzzleSource for HttpFeedSource {
    async fn fetch(&self) -> Result<Puzzle, SourceError> {
        let url = self.url();
        info!("fetching puzzle from {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| SourceError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let blob = response.text().await.map_err(|source| SourceError::Http {
            url: url.clone(),
            source,
        })?;
        Ok(parse_feed(&blob)?)
    }

    fn describe(&self) -> String {
        format!("feed {}", self.base)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
