//! Trial tracking, activation and the "may the app run" decision.

use crate::clock::{elapsed_calendar_days, Clock, SystemClock};
use crate::config::{LicenseConfig, StorageKeys};
use crate::error::LicenseResult;
use crate::store::LicenseStore;
use crate::token::{iso_week, normalize_candidate, TokenScheme, WeekToken};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// The current licensing state of an installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// A key has been activated.
    Licensed,
    /// Not licensed, trial still running.
    Trial {
        /// Whole days left in the trial (at least 1).
        days_remaining: u32,
    },
    /// Not licensed and the trial is over.
    Expired,
}

impl LicenseStatus {
    /// Returns true if the app may be used (Licensed or Trial).
    #[must_use]
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Licensed | Self::Trial { .. })
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Licensed => f.write_str("Licensed"),
            Self::Trial { days_remaining: 1 } => f.write_str("Trial: 1 day left"),
            Self::Trial { days_remaining } => write!(f, "Trial: {days_remaining} days left"),
            Self::Expired => f.write_str("Trial expired"),
        }
    }
}

/// Owns license state for one app installation.
///
/// Construct once at startup and share by reference. All queries are
/// re-evaluated against the clock and the store on every call.
pub struct LicenseEngine {
    scheme: TokenScheme,
    trial_days: u32,
    keys: StorageKeys,
    store: Arc<dyn LicenseStore>,
    clock: Arc<dyn Clock>,
    // Serializes state reads against activate/deactivate.
    state: Mutex<()>,
}

impl LicenseEngine {
    /// Creates an engine and records the first launch if it was never recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid. Persistence failures
    /// during first-launch recording are logged, not returned.
    pub fn new(
        config: &LicenseConfig,
        store: Arc<dyn LicenseStore>,
        clock: Arc<dyn Clock>,
    ) -> LicenseResult<Self> {
        let scheme = TokenScheme::from_config(config)?;
        let engine = Self {
            scheme,
            trial_days: config.trial_days,
            keys: config.storage_keys(),
            store,
            clock,
            state: Mutex::new(()),
        };
        engine.record_first_launch();
        Ok(engine)
    }

    /// Creates an engine driven by the host clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_system_clock(
        config: &LicenseConfig,
        store: Arc<dyn LicenseStore>,
    ) -> LicenseResult<Self> {
        Self::new(config, store, Arc::new(SystemClock))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_first_launch(&self) {
        let _guard = self.lock();
        // Presence, not readability: a corrupt value is never overwritten.
        if self.store.get_string(&self.keys.first_launch).is_some() {
            return;
        }
        let now = self.clock.now();
        match self.store.set_timestamp(&self.keys.first_launch, now) {
            Ok(()) => info!(first_launch = %now, "Recorded first launch"),
            Err(e) => warn!(error = %e, "Failed to record first launch; trial starts now"),
        }
    }

    /// Returns the token scheme in use.
    #[must_use]
    pub fn scheme(&self) -> &TokenScheme {
        &self.scheme
    }

    /// Returns the configured trial length in days.
    #[must_use]
    pub fn trial_days(&self) -> u32 {
        self.trial_days
    }

    /// Returns the recorded first launch, if present and readable.
    #[must_use]
    pub fn first_launch_date(&self) -> Option<DateTime<Utc>> {
        let _guard = self.lock();
        self.store.get_timestamp(&self.keys.first_launch)
    }

    /// Returns the activated key, if any.
    #[must_use]
    pub fn stored_license(&self) -> Option<String> {
        let _guard = self.lock();
        self.store.get_string(&self.keys.license_key)
    }

    /// True iff a license key has been stored. The key is not re-validated.
    #[must_use]
    pub fn is_licensed(&self) -> bool {
        let _guard = self.lock();
        self.licensed()
    }

    /// Whole calendar days left in the trial, never below zero.
    #[must_use]
    pub fn trial_days_remaining(&self) -> u32 {
        let _guard = self.lock();
        self.days_remaining()
    }

    /// True while trial days remain.
    #[must_use]
    pub fn is_trial_active(&self) -> bool {
        self.trial_days_remaining() > 0
    }

    /// The gating decision: licensed, or trial still active.
    #[must_use]
    pub fn can_use_app(&self) -> bool {
        self.status().is_usable()
    }

    /// Computes the current status from one consistent view of state.
    #[must_use]
    pub fn status(&self) -> LicenseStatus {
        let _guard = self.lock();
        if self.licensed() {
            return LicenseStatus::Licensed;
        }
        match self.days_remaining() {
            0 => LicenseStatus::Expired,
            days_remaining => LicenseStatus::Trial { days_remaining },
        }
    }

    /// Human-readable status: "Licensed", "Trial: N days left" or "Trial expired".
    #[must_use]
    pub fn status_text(&self) -> String {
        self.status().to_string()
    }

    /// Validates `candidate` against this week's and last week's tokens and
    /// stores it on a match. Returns false on mismatch without touching state.
    pub fn activate(&self, candidate: &str) -> bool {
        let normalized = normalize_candidate(candidate);
        let _guard = self.lock();

        let week = self.current_week();
        if !self.scheme.accepts(&normalized, week) {
            debug!(week, candidate_len = normalized.len(), "License key rejected");
            return false;
        }

        match self.store.set_string(&self.keys.license_key, &normalized) {
            Ok(()) => {
                info!(week, "License activated");
                true
            }
            Err(e) => {
                warn!(error = %e, "License key matched but could not be stored");
                false
            }
        }
    }

    /// Removes the stored license key. No-op if none is stored.
    pub fn deactivate(&self) {
        let _guard = self.lock();
        match self.store.remove(&self.keys.license_key) {
            Ok(()) => info!("License deactivated"),
            Err(e) => warn!(error = %e, "Failed to remove stored license key"),
        }
    }

    /// ISO week number of the current local date.
    #[must_use]
    pub fn current_week(&self) -> u32 {
        let now = self.clock.now();
        iso_week(self.clock.local(now).date())
    }

    /// The token for the current week. Diagnostic only; does not activate.
    #[must_use]
    pub fn current_token(&self) -> WeekToken {
        self.scheme.token_for_week(self.current_week())
    }

    /// The two tokens accepted right now. Diagnostic only; does not activate.
    #[must_use]
    pub fn valid_tokens(&self) -> [WeekToken; 2] {
        self.scheme.valid_tokens_for_week(self.current_week())
    }

    fn licensed(&self) -> bool {
        self.store.get_string(&self.keys.license_key).is_some()
    }

    fn days_remaining(&self) -> u32 {
        let Some(first_launch) = self.store.get_timestamp(&self.keys.first_launch) else {
            return self.trial_days;
        };
        let elapsed = elapsed_calendar_days(
            self.clock.local(first_launch),
            self.clock.local(self.clock.now()),
        );
        // A clock set before the first launch never extends the trial.
        let elapsed = u32::try_from(elapsed.max(0)).unwrap_or(u32::MAX);
        self.trial_days.saturating_sub(elapsed)
    }
}

impl fmt::Debug for LicenseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicenseEngine")
            .field("trial_days", &self.trial_days)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}
