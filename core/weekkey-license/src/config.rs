//! Compiled-in licensing constants.
//!
//! An app ships one `LicenseConfig`; the issuer must use the exact same
//! keyword set, separator and token length or tokens will never match.

use crate::error::{LicenseError, LicenseResult};
use serde::{Deserialize, Serialize};

/// Default trial length in days.
pub const TRIAL_DAYS: u32 = 7;

/// Number of keywords in the rotation pool.
pub const KEYWORD_COUNT: usize = 12;

/// Number of keywords in a single token.
pub const TOKEN_WORDS: usize = 4;

/// Separator between keywords in a token.
pub const SEPARATOR: &str = "-";

/// App name used to derive persistence keys when none is configured.
pub const DEFAULT_APP_NAME: &str = "WeekKey";

/// Placeholder keyword pool. Apps replace these with their own words.
pub const DEFAULT_KEYWORDS: [&str; KEYWORD_COUNT] = [
    "WORD1", "WORD2", "WORD3", "WORD4", "WORD5", "WORD6", "WORD7", "WORD8", "WORD9", "WORD10",
    "WORD11", "WORD12",
];

/// Licensing configuration for one app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    /// Prefix for the persisted keys (`<app>LicenseKey`, `<app>FirstLaunchDate`).
    pub app_name: String,
    /// Trial length in whole calendar days.
    pub trial_days: u32,
    /// Ordered keyword pool; order defines the rotation.
    pub keywords: Vec<String>,
    /// Separator placed between keywords.
    pub separator: String,
    /// Keywords per token.
    pub token_words: usize,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            trial_days: TRIAL_DAYS,
            keywords: DEFAULT_KEYWORDS.iter().map(|w| (*w).to_string()).collect(),
            separator: SEPARATOR.to_string(),
            token_words: TOKEN_WORDS,
        }
    }
}

impl LicenseConfig {
    /// Creates a default configuration for the named app.
    #[must_use]
    pub fn for_app(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Self::default()
        }
    }

    /// Replaces the keyword pool.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the trial length.
    #[must_use]
    pub fn with_trial_days(mut self, trial_days: u32) -> Self {
        self.trial_days = trial_days;
        self
    }

    /// Parses a configuration from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the result fails validation.
    pub fn from_json(json: &str) -> LicenseResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the persisted key names for this app.
    #[must_use]
    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::for_app(&self.app_name)
    }

    /// Checks that the configuration can produce a usable token scheme.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> LicenseResult<()> {
        if self.app_name.trim().is_empty() {
            return Err(invalid("app name must not be empty"));
        }
        if self.trial_days == 0 {
            return Err(invalid("trial must last at least one day"));
        }
        if self.separator.is_empty() {
            return Err(invalid("separator must not be empty"));
        }
        if self.keywords.len() != KEYWORD_COUNT {
            return Err(invalid(format!(
                "expected {KEYWORD_COUNT} keywords, got {}",
                self.keywords.len()
            )));
        }
        if self.token_words == 0 || self.token_words > self.keywords.len() {
            return Err(invalid(format!(
                "token length must be between 1 and {}, got {}",
                self.keywords.len(),
                self.token_words
            )));
        }

        let mut seen: Vec<String> = Vec::with_capacity(self.keywords.len());
        for word in &self.keywords {
            if word.is_empty() {
                return Err(invalid("keywords must not be empty"));
            }
            if word.chars().any(char::is_whitespace) {
                return Err(invalid(format!("keyword {word:?} contains whitespace")));
            }
            if word.contains(self.separator.as_str()) {
                return Err(invalid(format!(
                    "keyword {word:?} contains the separator {:?}",
                    self.separator
                )));
            }
            let upper = word.to_uppercase();
            if seen.contains(&upper) {
                return Err(invalid(format!("duplicate keyword {word:?}")));
            }
            seen.push(upper);
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> LicenseError {
    LicenseError::InvalidConfig(msg.into())
}

/// Key names under which license state is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Holds the activated license key.
    pub license_key: String,
    /// Holds the first-launch timestamp.
    pub first_launch: String,
}

impl StorageKeys {
    /// Derives the key names for an app.
    #[must_use]
    pub fn for_app(app_name: &str) -> Self {
        Self {
            license_key: format!("{app_name}LicenseKey"),
            first_launch: format!("{app_name}FirstLaunchDate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(LicenseConfig::default().validate().is_ok());
    }

    #[test]
    fn separator_inside_keyword_rejected() {
        let mut words: Vec<String> = DEFAULT_KEYWORDS.iter().map(|w| w.to_string()).collect();
        words[3] = "SNOW-MAN".into();
        let config = LicenseConfig::default().with_keywords(words);
        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("separator"));
    }

    #[test]
    fn storage_keys_use_app_prefix() {
        let keys = LicenseConfig::for_app("Clipper").storage_keys();
        assert_eq!(keys.license_key, "ClipperLicenseKey");
        assert_eq!(keys.first_launch, "ClipperFirstLaunchDate");
    }
}
