//! Control-plane access: the shared primary database holding the tenant
//! directory, behind the same storage-kind split as tenant data.

use crate::dialect::{MongoPrimary, PostgresPrimary, StorageKind, TenantLookupField};
use crate::error::Result;
use async_trait::async_trait;
use coral_models::{PrimaryDirectoryEntry, TenantRecord};
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait PrimaryStore: Send + Sync {
    /// Look a tenant up by one routing field. `None` means no such tenant.
    async fn find_tenant(
        &self,
        value: &str,
        field: TenantLookupField,
    ) -> Result<Option<TenantRecord>>;

    /// Email to tenant-identifier mapping for primary-directory routing.
    async fn find_directory_entry(&self, email: &str) -> Result<Option<PrimaryDirectoryEntry>>;
}

#[derive(Debug, Clone)]
pub struct PrimaryConfig {
    pub postgres_url: String,
    pub mongo_url: String,
    pub database: String,
    pub connect_timeout: Duration,
}

impl PrimaryConfig {
    pub fn from_env() -> Self {
        let timeout_secs = std::env::var("PRIMARY_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);
        Self {
            postgres_url: std::env::var("DATABASE_URL").unwrap_or_default(),
            mongo_url: std::env::var("MONGODB_CONNECTION_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database: std::env::var("PRIMARY_DB_NAME").unwrap_or_else(|_| "coral".to_string()),
            connect_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

pub async fn connect_primary(
    kind: StorageKind,
    config: &PrimaryConfig,
) -> Result<Arc<dyn PrimaryStore>> {
    match kind {
        StorageKind::Postgres => Ok(Arc::new(PostgresPrimary::connect(config).await?)),
        StorageKind::Mongo => Ok(Arc::new(MongoPrimary::connect(config).await?)),
    }
}
