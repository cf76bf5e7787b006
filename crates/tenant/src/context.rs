use coral_models::{EntityId, TenantRecord};

/// A resolved tenant: the routing key the request arrived with plus the full
/// control-plane record it mapped to.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub routing_key: String,
    pub record: TenantRecord,
}

impl TenantContext {
    pub fn new(routing_key: String, record: TenantRecord) -> Self {
        Self {
            routing_key,
            record,
        }
    }
}

/// Everything a tenant-data operation needs about who is acting: the tenant
/// and, once authenticated, the acting account. Passed explicitly through
/// every service call; there is no ambient request state.
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub tenant: TenantContext,
    pub account_id: Option<EntityId>,
}

impl OperationContext {
    pub fn new(tenant: TenantContext) -> Self {
        Self {
            tenant,
            account_id: None,
        }
    }

    pub fn with_account(mut self, account_id: EntityId) -> Self {
        self.account_id = Some(account_id);
        self
    }
}
