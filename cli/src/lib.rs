//! Shared helpers for the `weekkey` command-line tool.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, sync::Arc};
use tracing::debug;
use weekkey_license::{Clock, FileStore, LicenseConfig, LicenseEngine, LicenseStatus};

/// Machine-readable snapshot of an installation's license state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StatusReport {
    pub status: LicenseStatus,
    pub status_text: String,
    pub can_use_app: bool,
    pub licensed: bool,
    pub trial_days_remaining: u32,
    pub first_launch: Option<DateTime<Utc>>,
    pub current_week: u32,
}

impl StatusReport {
    /// Captures the engine's current state.
    pub fn capture(engine: &LicenseEngine) -> Self {
        let status = engine.status();
        Self {
            status,
            status_text: status.to_string(),
            can_use_app: status.is_usable(),
            licensed: matches!(status, LicenseStatus::Licensed),
            trial_days_remaining: engine.trial_days_remaining(),
            first_launch: engine.first_launch_date(),
            current_week: engine.current_week(),
        }
    }
}

/// Loads configuration from a JSON file, or the compiled defaults.
pub fn load_config(path: Option<&Path>) -> Result<LicenseConfig> {
    let Some(path) = path else {
        return Ok(LicenseConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = LicenseConfig::from_json(&json)
        .with_context(|| format!("invalid config {}", path.display()))?;
    debug!(path = %path.display(), app = %config.app_name, "Loaded license config");
    Ok(config)
}

/// Opens an engine over a file store in `store_dir`, or the app's platform
/// config directory when none is given.
pub fn open_engine(
    config: &LicenseConfig,
    store_dir: Option<&Path>,
    clock: Arc<dyn Clock>,
) -> Result<LicenseEngine> {
    let dir = match store_dir {
        Some(dir) => dir.to_path_buf(),
        None => FileStore::default_location(&config.app_name)?,
    };
    let store = FileStore::open(&dir)
        .with_context(|| format!("failed to open license store in {}", dir.display()))?;
    debug!(path = %store.path().display(), "Opened license store");
    Ok(LicenseEngine::new(config, Arc::new(store), clock)?)
}
