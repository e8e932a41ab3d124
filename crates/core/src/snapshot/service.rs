//! Tenant snapshot persistence over Apache OpenDAL.
//!
//! Each tenant's complete books serialize to one JSON object stored
//! under `{tenant_id}/books.json`. Saves overwrite the whole object;
//! concurrency control (last-write-wins on `updated_at`) happens in the
//! surrounding sync process, not here.

use opendal::{ErrorKind, Operator, services};
use sauda_shared::types::TenantId;
use tracing::info;

use super::config::SnapshotProvider;
use super::error::SnapshotError;
use crate::books::TenantBooks;

/// Stores and retrieves tenant book snapshots.
pub struct SnapshotStore {
    operator: Operator,
    provider_name: &'static str,
}

impl SnapshotStore {
    /// Creates a store over the given backend.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the backend cannot be
    /// initialized.
    pub fn new(provider: &SnapshotProvider) -> Result<Self, SnapshotError> {
        let operator = Self::create_operator(provider)?;
        Ok(Self {
            operator,
            provider_name: provider.name(),
        })
    }

    fn create_operator(provider: &SnapshotProvider) -> Result<Operator, SnapshotError> {
        let configuration = |e: opendal::Error| SnapshotError::Configuration(e.to_string());
        match provider {
            SnapshotProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                Ok(Operator::new(builder).map_err(configuration)?.finish())
            }
            SnapshotProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| SnapshotError::Configuration("invalid path".to_string()))?,
                );
                Ok(Operator::new(builder).map_err(configuration)?.finish())
            }
            SnapshotProvider::Memory => {
                let builder = services::Memory::default();
                Ok(Operator::new(builder).map_err(configuration)?.finish())
            }
        }
    }

    /// Storage key of a tenant's books.
    #[must_use]
    pub fn books_key(tenant_id: TenantId) -> String {
        format!("{tenant_id}/books.json")
    }

    /// Saves a tenant's books, overwriting any previous snapshot.
    ///
    /// # Errors
    ///
    /// Returns serialization or storage errors.
    pub async fn save(&self, books: &TenantBooks) -> Result<(), SnapshotError> {
        let key = Self::books_key(books.tenant_id());
        let bytes = serde_json::to_vec(books)?;
        self.operator.write(&key, bytes).await?;
        info!(%key, provider = self.provider_name, "Snapshot saved");
        Ok(())
    }

    /// Loads a tenant's books, or `None` when no snapshot exists.
    ///
    /// # Errors
    ///
    /// Returns storage errors, or a serialization error for a corrupt
    /// snapshot.
    pub async fn load(&self, tenant_id: TenantId) -> Result<Option<TenantBooks>, SnapshotError> {
        let key = Self::books_key(tenant_id);
        match self.operator.read(&key).await {
            Ok(buffer) => {
                let books: TenantBooks = serde_json::from_slice(&buffer.to_vec())?;
                Ok(Some(books))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a snapshot exists for the tenant.
    ///
    /// # Errors
    ///
    /// Returns storage errors.
    pub async fn exists(&self, tenant_id: TenantId) -> Result<bool, SnapshotError> {
        let key = Self::books_key(tenant_id);
        match self.operator.stat(&key).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes a tenant's snapshot. Deleting a missing snapshot is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns storage errors.
    pub async fn delete(&self, tenant_id: TenantId) -> Result<(), SnapshotError> {
        let key = Self::books_key(tenant_id);
        self.operator.delete(&key).await?;
        info!(%key, provider = self.provider_name, "Snapshot deleted");
        Ok(())
    }

    /// Backend name for logs.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider_name
    }
}
