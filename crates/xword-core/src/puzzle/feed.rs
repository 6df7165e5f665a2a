//! Upstream feed addressing and game identifiers.
//!
//! The upstream feed serves one puzzle per day, selected by a
//! `?date=YYMMDD` query derived from the local calendar.

use std::fmt;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default upstream feed endpoint.
pub const DEFAULT_FEED_BASE: &str = "https://nytsyn.pzzl.com/nytsyn-crossword-mh/nytsyncrossword";

/// A calendar date used to select the daily puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl FeedDate {
    /// Today's date in the local time zone.
    pub fn today() -> Self {
        Self::from(Local::now().date_naive())
    }

    /// Returns the `YYMMDD` query value.
    pub fn feed_query(&self) -> String {
        format!(
            "{:02}{:02}{:02}",
            self.year.rem_euclid(100),
            self.month,
            self.day
        )
    }
}

impl From<NaiveDate> for FeedDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

/// Builds the feed URL for `date`, e.g. `<base>?date=240307`.
pub fn feed_url(base: &str, date: FeedDate) -> String {
    format!("{}?date={}", base.trim_end_matches('/'), date.feed_query())
}

/// Opaque identifier of a co-solving game session.
///
/// Serialized as a bare string (`{"id": "..."}` in the issuance response).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Issues a fresh, unique id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `raw` can travel in a `?session=` query as-is.
    ///
    /// Ids are limited to the URL-unreserved characters (`A-Z a-z 0-9 - . _ ~`)
    /// so no percent-decoding is ever needed and each id has exactly one
    /// spelling on the wire.
    pub fn is_well_formed(raw: &str) -> bool {
        !raw.is_empty()
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~'))
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for GameId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
