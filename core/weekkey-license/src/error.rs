//! Error types for the licensing module.
//!
//! Engine queries never fail; these errors surface only while building an
//! engine from configuration or while talking to a persistence backend.

use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// The keyword set or another compiled constant is unusable.
    #[error("invalid license configuration: {0}")]
    InvalidConfig(String),

    /// A persistence backend rejected a read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// File system error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
