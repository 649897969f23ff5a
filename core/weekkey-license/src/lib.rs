//! Trial gating and rotating weekly license tokens for WeekKey apps.
//!
//! This crate handles:
//! - A fixed-length trial measured from the first launch
//! - Offline license tokens that rotate every ISO-8601 week
//! - One-time activation that permanently licenses an installation
//! - A small key/value persistence boundary for the two stored values
//!
//! # Design Principles
//!
//! - **Offline-only**: No network calls; issuer and validator agree on tokens
//!   by sharing the same keyword set and the same calendar
//! - **One-time gate**: A stored key is never re-validated against the
//!   rotating scheme
//! - **Graceful degradation**: Unreadable persisted state means "trial starts
//!   now", never a crash
//!
//! # Token Format
//!
//! A token is four consecutive keywords from a 12-word pool joined by `-`.
//! Week `w` starts at keyword `(w - 1) mod 12`, so the sequence repeats every
//! twelve weeks. At any moment the tokens for the current and the previous
//! ISO week are both accepted.

mod clock;
mod config;
mod engine;
mod error;
mod store;
mod token;

pub use clock::{elapsed_calendar_days, Clock, FixedClock, SystemClock};
pub use config::{
    LicenseConfig, StorageKeys, DEFAULT_APP_NAME, DEFAULT_KEYWORDS, KEYWORD_COUNT, SEPARATOR,
    TOKEN_WORDS, TRIAL_DAYS,
};
pub use engine::{LicenseEngine, LicenseStatus};
pub use error::{LicenseError, LicenseResult};
pub use store::{FileStore, LicenseStore, MemoryStore, STORE_FILE_NAME};
pub use token::{
    iso_week, normalize_candidate, previous_week, KeywordSet, TokenScheme, WeekToken,
    WEEKS_PER_YEAR_APPROX,
};
