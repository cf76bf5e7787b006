use crate::error::Result;
use crate::TenantError;
use coral_database::{PrimaryStore, TenantLookupField};
use std::sync::Arc;

/// How requests carry tenant identity, fixed at deployment time.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// Virtual-host routing: the `Host` header is the routing key. Enabled
    /// unless explicitly turned off.
    pub multi_domain: bool,

    /// Sign-in ignores headers and maps the user's email through the
    /// primary directory instead.
    pub identify_from_primary: bool,
}

impl RoutingConfig {
    pub fn from_env() -> Self {
        Self {
            multi_domain: std::env::var("MULTI_DOMAIN")
                .map(|v| v != "false")
                .unwrap_or(true),
            identify_from_primary: std::env::var("IDENTIFY_TENANT_FROM_PRIMARY_DB")
                .map(|v| v == "true")
                .unwrap_or(false),
        }
    }
}

/// Tenant identity material extracted from one request's headers.
#[derive(Debug, Clone, Default)]
pub struct RoutingHint {
    pub host: Option<String>,
    pub tenant_id_header: Option<String>,
}

/// Turns request material into a routing key for the tenant directory.
#[derive(Clone)]
pub struct IdentityResolver {
    config: RoutingConfig,
    primary: Arc<dyn PrimaryStore>,
}

impl IdentityResolver {
    pub fn new(config: RoutingConfig, primary: Arc<dyn PrimaryStore>) -> Self {
        Self { config, primary }
    }

    /// The tenant-table field routing keys are matched against. Host keys
    /// match the host column, everything else matches the tenant name.
    pub fn lookup_field(&self) -> TenantLookupField {
        if !self.config.identify_from_primary && self.config.multi_domain {
            TenantLookupField::Host
        } else {
            TenantLookupField::Name
        }
    }

    /// Header-only routing, for operations that already carry an
    /// authenticated identity.
    pub fn header_routing_key(&self, hint: &RoutingHint) -> Option<String> {
        if self.config.multi_domain {
            hint.host.clone()
        } else {
            hint.tenant_id_header.clone()
        }
    }

    /// Routing key for sign-in. Primary-directory mode consults the
    /// email-to-tenant mapping and a miss is an error, never a fallback to
    /// headers; header identity is unauthenticated input and must not win
    /// over an authoritative directory.
    pub async fn routing_key(&self, hint: &RoutingHint, email: &str) -> Result<Option<String>> {
        if self.config.identify_from_primary {
            let entry = self
                .primary
                .find_directory_entry(email)
                .await?
                .ok_or(TenantError::PrimaryDirectoryMiss)?;
            Ok(Some(entry.tenant_identifier))
        } else {
            Ok(self.header_routing_key(hint))
        }
    }
}
