use crate::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureLimits {
    pub permission: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRestriction {
    pub label: String,
    pub feature_key: String,
    pub feature_limits: FeatureLimits,
}

/// Immutable-per-fetch snapshot of one tenant from the control-plane
/// database. Read-mostly; mutated only by tenant-administration flows,
/// which must invalidate the corresponding cache entry.
///
/// The tenant's database name is the tenant name itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRecord {
    #[serde(rename = "_id")]
    pub id: EntityId,

    /// Virtual-host routing key (matched in multi-domain deployments).
    pub host: String,

    /// Tenant name (matched when an explicit tenant-id header is used).
    pub name: String,

    pub db_host: String,
    pub db_port: u16,
    pub db_user_name: String,
    pub db_password: String,

    #[serde(default)]
    pub features_restrictions: Vec<FeatureRestriction>,
}

impl TenantRecord {
    pub fn database_name(&self) -> &str {
        &self.name
    }
}

/// One row of the shared, tenant-agnostic primary directory: maps a user
/// email to the routing key of the tenant that owns the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryDirectoryEntry {
    pub email: String,
    pub tenant_identifier: String,
}
