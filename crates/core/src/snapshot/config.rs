//! Snapshot storage backend configuration.

use std::path::PathBuf;

use sauda_shared::config::SnapshotSettings;
use serde::{Deserialize, Serialize};

use super::error::SnapshotError;

/// Snapshot storage backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SnapshotProvider {
    /// S3-compatible storage: Cloudflare R2, AWS S3, MinIO.
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
    },
    /// Local filesystem.
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// In-process memory, for tests and demos.
    Memory,
}

impl SnapshotProvider {
    /// Create an S3-compatible provider.
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create a local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Provider name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "fs",
            Self::Memory => "memory",
        }
    }

    /// Resolves the provider from application settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown provider name or
    /// missing S3 credentials.
    pub fn from_settings(settings: &SnapshotSettings) -> Result<Self, SnapshotError> {
        match settings.provider.as_str() {
            "memory" => Ok(Self::Memory),
            "fs" => Ok(Self::local_fs(settings.fs_root.clone())),
            "s3" => {
                let require = |field: &Option<String>, name: &str| {
                    field.clone().ok_or_else(|| {
                        SnapshotError::Configuration(format!("missing S3 setting: {name}"))
                    })
                };
                Ok(Self::S3 {
                    endpoint: require(&settings.s3_endpoint, "s3_endpoint")?,
                    bucket: require(&settings.s3_bucket, "s3_bucket")?,
                    access_key_id: require(&settings.s3_access_key_id, "s3_access_key_id")?,
                    secret_access_key: require(
                        &settings.s3_secret_access_key,
                        "s3_secret_access_key",
                    )?,
                    region: require(&settings.s3_region, "s3_region")?,
                })
            }
            other => Err(SnapshotError::Configuration(format!(
                "unknown snapshot provider: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: &str) -> SnapshotSettings {
        SnapshotSettings {
            provider: provider.to_string(),
            fs_root: "./snapshots".to_string(),
            s3_endpoint: None,
            s3_bucket: None,
            s3_access_key_id: None,
            s3_secret_access_key: None,
            s3_region: None,
        }
    }

    #[test]
    fn test_provider_names() {
        assert_eq!(SnapshotProvider::Memory.name(), "memory");
        assert_eq!(SnapshotProvider::local_fs("./x").name(), "fs");
        assert_eq!(
            SnapshotProvider::s3("http://localhost:9000", "b", "k", "s", "auto").name(),
            "s3"
        );
    }

    #[test]
    fn test_from_settings() {
        assert!(matches!(
            SnapshotProvider::from_settings(&settings("memory")),
            Ok(SnapshotProvider::Memory)
        ));
        assert!(matches!(
            SnapshotProvider::from_settings(&settings("fs")),
            Ok(SnapshotProvider::LocalFs { .. })
        ));
        assert!(SnapshotProvider::from_settings(&settings("gcs")).is_err());
        // S3 without credentials is a configuration error.
        assert!(SnapshotProvider::from_settings(&settings("s3")).is_err());
    }
}
