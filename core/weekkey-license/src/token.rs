//! Rotating weekly token derivation.
//!
//! A token for week `w` is a sliding window of consecutive keywords starting
//! at index `(w - 1) mod N`, wrapping around the pool. Derivation is a pure
//! function of the week number and the keyword set, so any party holding the
//! same set and the same calendar computes the same token.

use crate::config::LicenseConfig;
use crate::error::LicenseResult;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Week count used when the previous week falls into the prior year.
///
/// This ignores 53-week ISO years on purpose so that already-issued tokens
/// keep validating the same way across year boundaries.
pub const WEEKS_PER_YEAR_APPROX: u32 = 52;

/// Returns the ISO-8601 week number (1..=53) of a calendar date.
#[must_use]
pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Returns the week before `week`, wrapping week 1 to week 52.
#[must_use]
pub fn previous_week(week: u32) -> u32 {
    if week <= 1 {
        week + WEEKS_PER_YEAR_APPROX - 1
    } else {
        week - 1
    }
}

/// Normalizes a user-entered key: surrounding whitespace removed, upper-cased.
#[must_use]
pub fn normalize_candidate(candidate: &str) -> String {
    candidate.trim().to_uppercase()
}

/// A validated, upper-cased, ordered keyword pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    words: Vec<String>,
}

impl KeywordSet {
    /// Returns the number of keywords (the rotation period in weeks).
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the pool has no keywords; never the case once validated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the keyword at `index`, wrapping around the pool.
    #[must_use]
    pub fn word(&self, index: usize) -> &str {
        &self.words[index % self.words.len()]
    }

    /// Iterates the keywords in rotation order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

/// A license token valid for one week.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekToken(String);

impl WeekToken {
    /// Returns the token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WeekToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for WeekToken {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for WeekToken {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Derives tokens from a keyword set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenScheme {
    keywords: KeywordSet,
    separator: String,
    token_words: usize,
}

impl TokenScheme {
    /// Builds a scheme from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn from_config(config: &LicenseConfig) -> LicenseResult<Self> {
        config.validate()?;
        Ok(Self {
            keywords: KeywordSet {
                words: config.keywords.iter().map(|w| w.to_uppercase()).collect(),
            },
            separator: config.separator.clone(),
            token_words: config.token_words,
        })
    }

    /// Returns the keyword pool.
    #[must_use]
    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    /// Returns the token for a 1-based week number.
    ///
    /// Week 1 starts at keyword 0; the sequence repeats every `N` weeks.
    #[must_use]
    pub fn token_for_week(&self, week: u32) -> WeekToken {
        let n = self.keywords.len() as i64;
        let start = (i64::from(week) - 1).rem_euclid(n) as usize;
        let words: Vec<&str> = (0..self.token_words)
            .map(|i| self.keywords.word(start + i))
            .collect();
        WeekToken(words.join(&self.separator))
    }

    /// Returns the token for the ISO week containing `date`.
    #[must_use]
    pub fn token_for_date(&self, date: NaiveDate) -> WeekToken {
        self.token_for_week(iso_week(date))
    }

    /// Returns the tokens accepted during `current_week`: that week's token
    /// followed by the previous week's. Never deduplicated.
    #[must_use]
    pub fn valid_tokens_for_week(&self, current_week: u32) -> [WeekToken; 2] {
        [
            self.token_for_week(current_week),
            self.token_for_week(previous_week(current_week)),
        ]
    }

    /// Returns true if an already-normalized candidate is accepted during
    /// `current_week`.
    #[must_use]
    pub fn accepts(&self, normalized: &str, current_week: u32) -> bool {
        self.valid_tokens_for_week(current_week)
            .iter()
            .any(|token| token == normalized)
    }
}
