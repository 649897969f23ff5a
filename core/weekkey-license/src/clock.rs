//! Wall-clock and host-calendar access.
//!
//! Trial days and ISO weeks are both computed in the host's local calendar,
//! so the clock hands out local date-times as well as the current instant.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDateTime, Offset, Utc};
use std::sync::{Mutex, PoisonError};

/// Source of the current time and of local calendar conversions.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Converts an instant to a local wall-clock date-time.
    fn local(&self, at: DateTime<Utc>) -> NaiveDateTime;
}

/// The host clock and time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local(&self, at: DateTime<Utc>) -> NaiveDateTime {
        at.with_timezone(&Local).naive_local()
    }
}

/// A manually driven clock with a fixed UTC offset.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    /// Creates a clock stopped at `now`, reporting local time in UTC.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_offset(now, Utc.fix())
    }

    /// Creates a clock stopped at `now` with a local offset.
    #[must_use]
    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Mutex::new(now),
            offset,
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Moves the clock forward (or back, for a negative duration).
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn local(&self, at: DateTime<Utc>) -> NaiveDateTime {
        at.with_timezone(&self.offset).naive_local()
    }
}

/// Whole calendar days from `from` to `to`.
///
/// Counts a day only once the same wall-clock time has been reached on a
/// later date, so a partial day never rounds up and a 23- or 25-hour DST day
/// still counts as one. Negative when `to` precedes `from`.
#[must_use]
pub fn elapsed_calendar_days(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let mut days = (to.date() - from.date()).num_days();
    if days > 0 && to.time() < from.time() {
        days -= 1;
    } else if days < 0 && to.time() > from.time() {
        days += 1;
    }
    days
}
