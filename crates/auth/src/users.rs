use coral_database::TenantConnectionManager;
use coral_models::{Page, SearchRequest, User};
use coral_tenant::OperationContext;

#[derive(Clone)]
pub struct UserService {
    connections: TenantConnectionManager,
}

impl UserService {
    pub fn new(connections: TenantConnectionManager) -> Self {
        Self { connections }
    }

    /// Keyword search over users, with the `type` filter applied as a
    /// role-type membership constraint rather than a column match.
    pub async fn search(
        &self,
        ctx: &OperationContext,
        search: SearchRequest,
    ) -> coral_database::Result<Page<User>> {
        tracing::debug!(tenant = %ctx.tenant.record.name, "user search");
        self.connections
            .with_tenant_connection(&ctx.tenant.record, move |handle| {
                Box::pin(async move {
                    let user_type = search.type_filter_trimmed().map(str::to_string);
                    handle.store().search_users(&search, user_type.as_deref()).await
                })
            })
            .await
    }
}
