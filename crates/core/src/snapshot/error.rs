//! Snapshot persistence error types.

use thiserror::Error;

/// Snapshot persistence errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Backend configuration error.
    #[error("snapshot configuration error: {0}")]
    Configuration(String),

    /// Backend operation failed.
    #[error("snapshot storage operation failed: {0}")]
    Storage(String),

    /// Books could not be encoded or decoded.
    #[error("snapshot serialization failed: {0}")]
    Serialization(String),
}

impl SnapshotError {
    /// Returns the error code for presentation layers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "SNAPSHOT_CONFIGURATION",
            Self::Storage(_) => "SNAPSHOT_STORAGE",
            Self::Serialization(_) => "SNAPSHOT_SERIALIZATION",
        }
    }
}

impl From<opendal::Error> for SnapshotError {
    fn from(err: opendal::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
