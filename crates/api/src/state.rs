use coral_auth::{AuthService, RoleService, UserService};
use coral_tenant::{IdentityResolver, TenantDirectory};

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub roles: RoleService,
    pub users: UserService,
    pub resolver: IdentityResolver,
    pub directory: TenantDirectory,
}
