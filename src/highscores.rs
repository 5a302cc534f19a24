//! High score leaderboard table
//!
//! Tracks the top 10 runs and owns the compact text format they are
//! persisted in: `name|score_base36|note` segments joined by `,`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;
/// Separates entries in the wire format
pub const ENTRY_SEPARATOR: char = ',';
/// Separates fields inside an entry
pub const FIELD_SEPARATOR: char = '|';
/// Longest accepted player name
pub const MAX_NAME_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} cannot contain `{ch}`")]
    Separator { field: &'static str, ch: char },
    #[error("name must be 1-10 characters of a-z, 0-9, `_` or `-`, got `{0}`")]
    InvalidName(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("entry {index} has {fields} fields, expected 3")]
    FieldCount { index: usize, fields: usize },
    #[error("entry {index} has invalid base-36 score `{score}`")]
    Score { index: usize, score: String },
    #[error("{0} entries exceeds the table size")]
    TooManyEntries(usize),
    #[error("entry {0} is out of score order")]
    Unsorted(usize),
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub score: u64,
    /// Free-form detail shown next to the score (play time)
    pub note: String,
}

/// Check a name typed in at the score-submission prompt
pub fn validate_player_name(name: &str) -> Result<(), ValidationError> {
    let valid_char = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-';
    if name.is_empty() || name.len() > MAX_NAME_LEN || !name.chars().all(valid_char) {
        return Err(ValidationError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn check_separators(field: &'static str, value: &str) -> Result<(), ValidationError> {
    match value
        .chars()
        .find(|&c| c == ENTRY_SEPARATOR || c == FIELD_SEPARATOR)
    {
        Some(ch) => Err(ValidationError::Separator { field, ch }),
        None => Ok(()),
    }
}

/// Lowercase base-36 digits, as JavaScript's `toString(36)`
pub fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    loop {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

pub fn from_base36(s: &str) -> Option<u64> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    u64::from_str_radix(&s.to_ascii_lowercase(), 36).ok()
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeaderboardTable {
    entries: Vec<Entry>,
}

impl LeaderboardTable {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_HIGH_SCORES
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Lowest held score, 0 when empty
    pub fn last_score(&self) -> u64 {
        self.entries.last().map(|e| e.score).unwrap_or(0)
    }

    /// Check if a score would be admitted
    pub fn qualifies(&self, score: u64) -> bool {
        !self.is_full() || score > self.last_score()
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        // Ties rank below existing entries
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a run. `Ok(false)` means the score was too low for a full table.
    pub fn add(&mut self, name: &str, score: u64, note: &str) -> Result<bool, ValidationError> {
        check_separators("name", name)?;
        check_separators("note", note)?;

        if !self.qualifies(score) {
            return Ok(false);
        }

        self.entries.push(Entry {
            name: name.to_string(),
            score,
            note: note.to_string(),
        });
        // Stable: equal scores keep insertion order
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);

        Ok(true)
    }

    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}|{}|{}", e.name, to_base36(e.score), e.note))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Replace the contents with a parsed wire string. On error the table
    /// is left as it was.
    pub fn deserialize(&mut self, data: &str) -> Result<(), ParseError> {
        if data.is_empty() {
            self.entries.clear();
            return Ok(());
        }

        let mut entries = Vec::new();
        for (index, segment) in data.split(ENTRY_SEPARATOR).enumerate() {
            let fields: Vec<&str> = segment.split(FIELD_SEPARATOR).collect();
            let &[name, score, note] = fields.as_slice() else {
                return Err(ParseError::FieldCount {
                    index,
                    fields: fields.len(),
                });
            };
            let score = from_base36(score).ok_or_else(|| ParseError::Score {
                index,
                score: score.to_string(),
            })?;
            entries.push(Entry {
                name: name.to_string(),
                score,
                note: note.to_string(),
            });
        }

        if entries.len() > MAX_HIGH_SCORES {
            return Err(ParseError::TooManyEntries(entries.len()));
        }
        if let Some(i) = entries.windows(2).position(|w| w[0].score < w[1].score) {
            return Err(ParseError::Unsorted(i + 1));
        }

        self.entries = entries;
        Ok(())
    }
}
