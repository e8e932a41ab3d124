//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Company (tenant) configuration.
    #[serde(default)]
    pub company: CompanyConfig,
    /// Snapshot persistence configuration.
    #[serde(default)]
    pub snapshot: SnapshotSettings,
}

/// Company (tenant) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyConfig {
    /// Display name of the company the seeder boots.
    #[serde(default = "default_company_name")]
    pub name: String,
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            name: default_company_name(),
        }
    }
}

fn default_company_name() -> String {
    "Sauda Demo Traders".to_string()
}

/// Snapshot persistence settings.
///
/// `provider` selects the backend: `memory` (tests, demos), `fs` (local
/// development) or `s3` (S3-compatible object storage). The `s3_*` fields
/// are only required when `provider = "s3"`.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotSettings {
    /// Backend name: `memory`, `fs` or `s3`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Root directory for the `fs` provider.
    #[serde(default = "default_fs_root")]
    pub fs_root: String,
    /// Endpoint URL for the `s3` provider.
    #[serde(default)]
    pub s3_endpoint: Option<String>,
    /// Bucket name for the `s3` provider.
    #[serde(default)]
    pub s3_bucket: Option<String>,
    /// Access key id for the `s3` provider.
    #[serde(default)]
    pub s3_access_key_id: Option<String>,
    /// Secret access key for the `s3` provider.
    #[serde(default)]
    pub s3_secret_access_key: Option<String>,
    /// Region for the `s3` provider.
    #[serde(default)]
    pub s3_region: Option<String>,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            fs_root: default_fs_root(),
            s3_endpoint: None,
            s3_bucket: None,
            s3_access_key_id: None,
            s3_secret_access_key: None,
            s3_region: None,
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_fs_root() -> String {
    "./snapshots".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources are layered: `config/default`, then `config/{RUN_MODE}`,
    /// then `SAUDA__`-prefixed environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SAUDA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
