//! Typed clearance numbers
//!
//! A clearance number is the citation-style identifier printed in premarket
//! documents: a short letter prefix, two year digits, and a four-digit
//! sequence (`K173585`, `P810002`, `DEN170009`). The raw pattern lives here
//! and nowhere else; everything downstream works with the parsed value type.

use regex_lite::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// The clearance-number syntax: 1–3 letters, 2 year digits, 4 sequence digits.
static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<kind>[A-Za-z]{1,3})(?P<year>[0-9]{2})(?P<seq>[0-9]{4})")
        .expect("clearance-number pattern is valid")
});

/// Error returned when no clearance number is found in the input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no clearance number found in {input:?}")]
pub struct ParseError {
    input: String,
}

/// A parsed clearance number.
///
/// Equality, hashing, and ordering all go through the canonical string — the
/// exact substring that matched, casing preserved — so identifiers written to
/// disk and re-parsed compare equal to the originals, and sorted output files
/// are stable across runs.
#[derive(Debug, Clone)]
pub struct ApprovalId {
    canonical: String,
    kind: String,
    year: u8,
    sequence: u16,
}

impl ApprovalId {
    /// Canonical form of the terminal sentinel (see [`ApprovalId::terminal`]).
    pub const TERMINAL_NUMBER: &'static str = "K000000";

    /// Parse the first clearance number found anywhere in `text`.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let caps = NUMBER_PATTERN.captures(text).ok_or_else(|| ParseError {
            input: text.trim().to_string(),
        })?;
        let matched = caps
            .get(0)
            .ok_or_else(|| ParseError {
                input: text.trim().to_string(),
            })?
            .as_str();
        // The two digit groups are guaranteed numeric by the pattern.
        let year = caps["year"].parse().map_err(|_| ParseError {
            input: text.trim().to_string(),
        })?;
        let sequence = caps["seq"].parse().map_err(|_| ParseError {
            input: text.trim().to_string(),
        })?;
        Ok(Self {
            canonical: matched.to_string(),
            kind: caps["kind"].to_string(),
            year,
            sequence,
        })
    }

    /// Parse every clearance number embedded in `text`, in order of
    /// appearance. Matches never overlap; text with no numbers yields an
    /// empty collection rather than an error.
    pub fn parse_all(text: &str) -> Vec<Self> {
        NUMBER_PATTERN
            .find_iter(text)
            .filter_map(|m| Self::parse(m.as_str()).ok())
            .collect()
    }

    /// The sentinel identifier marking "no further predicates".
    ///
    /// Dead ends in a lineage graph are edges into this node. It is never
    /// fetched and never expanded.
    pub fn terminal() -> Self {
        Self {
            canonical: Self::TERMINAL_NUMBER.to_string(),
            kind: "K".to_string(),
            year: 0,
            sequence: 0,
        }
    }

    /// Whether this is the terminal sentinel.
    pub fn is_terminal(&self) -> bool {
        self.canonical == Self::TERMINAL_NUMBER
    }

    /// The canonical string form, exactly as matched.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// The letter prefix (`K`, `P`, `DEN`, ...), casing preserved.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The two year digits, zero-padded (`"17"`, `"81"`, `"05"`).
    pub fn year_digits(&self) -> String {
        format!("{:02}", self.year)
    }

    /// The four sequence digits, zero-padded (`"3585"`).
    pub fn sequence_digits(&self) -> String {
        format!("{:04}", self.sequence)
    }

    /// The four-digit year.
    ///
    /// Century inference: two-digit values above 70 are read as 1900s, the
    /// rest as 2000s. The cutoff is inherited vendor behavior; numbers issued
    /// near either side of it would be ambiguous.
    pub fn year(&self) -> i32 {
        let century = if self.year > 70 { 1900 } else { 2000 };
        century + i32::from(self.year)
    }
}

impl PartialEq for ApprovalId {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for ApprovalId {}

impl std::hash::Hash for ApprovalId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for ApprovalId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ApprovalId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl std::fmt::Display for ApprovalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical)
    }
}

impl std::str::FromStr for ApprovalId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
