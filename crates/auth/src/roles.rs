use coral_database::TenantConnectionManager;
use coral_models::{Page, Role, RoleUsersRow, SearchRequest};
use coral_tenant::OperationContext;

/// Role reads against the acting tenant's database. Every call dials the
/// tenant, runs, and hangs up.
#[derive(Clone)]
pub struct RoleService {
    connections: TenantConnectionManager,
}

impl RoleService {
    pub fn new(connections: TenantConnectionManager) -> Self {
        Self { connections }
    }

    pub async fn search(
        &self,
        ctx: &OperationContext,
        search: SearchRequest,
    ) -> coral_database::Result<Page<Role>> {
        tracing::debug!(tenant = %ctx.tenant.record.name, "role search");
        self.connections
            .with_tenant_connection(&ctx.tenant.record, move |handle| {
                Box::pin(async move { handle.store().search_roles(&search).await })
            })
            .await
    }

    pub async fn users_by_role(
        &self,
        ctx: &OperationContext,
        search: SearchRequest,
    ) -> coral_database::Result<Page<RoleUsersRow>> {
        tracing::debug!(tenant = %ctx.tenant.record.name, "users-by-role report");
        self.connections
            .with_tenant_connection(&ctx.tenant.record, move |handle| {
                Box::pin(async move { handle.store().users_by_role(&search).await })
            })
            .await
    }
}
