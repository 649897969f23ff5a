//! Persistence boundary for license state.
//!
//! The engine persists exactly two values: the activated key and the
//! first-launch timestamp. Backends only need string get/set/remove;
//! timestamps are stored as RFC 3339 text.

use crate::error::{LicenseError, LicenseResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};

/// File name used by [`FileStore`].
pub const STORE_FILE_NAME: &str = "license.json";

/// String-keyed, app-scoped key/value persistence.
pub trait LicenseStore: Send + Sync {
    /// Reads a string value.
    fn get_string(&self, key: &str) -> Option<String>;

    /// Writes a string value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot persist the value.
    fn set_string(&self, key: &str, value: &str) -> LicenseResult<()>;

    /// Removes a value. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot persist the removal.
    fn remove(&self, key: &str) -> LicenseResult<()>;

    /// Reads a timestamp. Absent or unparseable values yield `None`.
    fn get_timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.get_string(key)?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(e) => {
                debug!(key, error = %e, "Ignoring unreadable timestamp");
                None
            }
        }
    }

    /// Writes a timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot persist the value.
    fn set_timestamp(&self, key: &str, value: DateTime<Utc>) -> LicenseResult<()> {
        self.set_string(key, &value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// In-memory store. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LicenseStore for MemoryStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_string(&self, key: &str, value: &str) -> LicenseResult<()> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> LicenseResult<()> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// JSON file store.
///
/// Values live in `{dir}/license.json` and are cached in memory; every write
/// rewrites the whole file through a temporary sibling and a rename.
pub struct FileStore {
    path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Opens (or prepares to create) a store in `dir`, creating the directory
    /// if needed. A corrupt file is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the existing
    /// file cannot be read from disk. Undecodable contents are not an error.
    pub fn open(dir: &Path) -> LicenseResult<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(STORE_FILE_NAME);

        let cache = if path.exists() {
            decode_values(&path, &fs::read(&path)?)
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    /// Returns the platform config directory for an app, e.g.
    /// `~/Library/Application Support/<app>` on macOS.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no config directory.
    pub fn default_location(app_name: &str) -> LicenseResult<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(app_name))
            .ok_or_else(|| LicenseError::Storage("no platform config directory".to_string()))
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, values: &HashMap<String, String>) -> LicenseResult<()> {
        let contents = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut HashMap<String, String>)) -> LicenseResult<()> {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = cache.clone();
        apply(&mut next);
        self.save(&next)?;
        *cache = next;
        Ok(())
    }
}

/// Decodes the store file, keeping every string entry. Undecodable files
/// yield an empty map; non-string entries are skipped one by one.
fn decode_values(path: &Path, bytes: &[u8]) -> HashMap<String, String> {
    let object: Map<String, Value> = match serde_json::from_slice(bytes) {
        Ok(object) => object,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "License store unreadable, starting empty");
            return HashMap::new();
        }
    };

    object
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(value) => Some((key, value)),
            other => {
                warn!(
                    path = %path.display(),
                    key = %key,
                    kind = json_kind(&other),
                    "Skipping non-string license store entry"
                );
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl LicenseStore for FileStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_string(&self, key: &str, value: &str) -> LicenseResult<()> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> LicenseResult<()> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .finish()
    }
}
