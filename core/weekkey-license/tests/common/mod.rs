//! Shared test helpers for license tests.

#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use weekkey_license::{FixedClock, LicenseConfig, LicenseEngine, MemoryStore};

/// Single-letter keyword pool, so token `A-B-C-D` belongs to week 1.
pub const LETTERS: [&str; 12] = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L"];

/// A configuration using [`LETTERS`] and the default 7-day trial.
pub fn letters_config() -> LicenseConfig {
    LicenseConfig::for_app("TestApp").with_keywords(LETTERS)
}

/// Noon UTC on the given date.
pub fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc()
}

/// Monday 2026-03-02, ISO week 10.
pub fn week_10() -> DateTime<Utc> {
    noon(2026, 3, 2)
}

/// An engine over a fresh in-memory store and a stopped clock.
pub struct Harness {
    pub engine: LicenseEngine,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_store(now, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(now: DateTime<Utc>, store: Arc<MemoryStore>) -> Self {
        let clock = Arc::new(FixedClock::new(now));
        let engine = LicenseEngine::new(&letters_config(), store.clone(), clock.clone()).unwrap();
        Self {
            engine,
            store,
            clock,
        }
    }
}
