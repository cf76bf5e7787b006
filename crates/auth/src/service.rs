//! Sign-in: tenant resolution, an ephemeral tenant-database session for the
//! credential check, then token issuance against a closed session.

use crate::error::{AuthError, Result};
use crate::jwt::JwtService;
use crate::password::verify_password;
use coral_database::{TenantConnectionManager, TenantStore};
use coral_models::{EntityId, FeatureRestriction, Role, TenantRecord, User};
use coral_tenant::{IdentityResolver, RoutingHint, TenantDirectory};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Role portion of a successful sign-in. Single-role accounts get the role
/// flattened into the user object; multi-role accounts get the list.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RoleView {
    Single {
        role: String,
        #[serde(rename = "roleId")]
        role_id: EntityId,
        #[serde(rename = "roleAcl")]
        role_acl: serde_json::Value,
        #[serde(rename = "isDefault")]
        is_default: bool,
    },
    Multiple {
        roles: Vec<Role>,
    },
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: String,
    pub tenant: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedInUserData {
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SignedInUser {
    pub uuid: EntityId,

    #[serde(rename = "userAcl")]
    pub user_acl: serde_json::Value,

    #[serde(flatten)]
    pub role_view: RoleView,

    #[serde(rename = "featureRestrictions")]
    pub feature_restrictions: Vec<FeatureRestriction>,

    pub data: SignedInUserData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub reset_password: bool,

    /// Snake_case on the wire, unlike its camelCase siblings.
    #[serde(rename = "access_token")]
    pub access_token: String,

    pub tenant: String,
    pub user: SignedInUser,
}

/// Either a token or a status short-circuit; the wire shape is whichever
/// variant applies, with no discriminator.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SignInOutcome {
    Status(StatusResponse),
    Authenticated(Box<SignInResponse>),
}

enum TenantSignIn {
    Blocked(User),
    Allowed(User, RoleView),
}

#[derive(Clone)]
pub struct AuthService {
    resolver: IdentityResolver,
    directory: TenantDirectory,
    connections: TenantConnectionManager,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(
        resolver: IdentityResolver,
        directory: TenantDirectory,
        connections: TenantConnectionManager,
        jwt: JwtService,
    ) -> Self {
        Self {
            resolver,
            directory,
            connections,
            jwt,
        }
    }

    pub async fn sign_in(&self, hint: &RoutingHint, request: &SignInRequest) -> Result<SignInOutcome> {
        request.validate()?;

        let routing_key = self
            .resolver
            .routing_key(hint, &request.email)
            .await?
            .ok_or(AuthError::TenantNotFound)?;
        let record = self
            .directory
            .resolve(&routing_key, self.resolver.lookup_field())
            .await?
            .ok_or(AuthError::TenantNotFound)?;

        let email = request.email.clone();
        let password = request.password.clone();
        let outcome = self
            .connections
            .with_tenant_connection::<TenantSignIn, AuthError, _>(&record, move |handle| {
                Box::pin(async move {
                    let store = handle.store();
                    let user = store
                        .find_user_by_email(&email)
                        .await?
                        .ok_or(AuthError::WrongCredentials)?;
                    if !verify_password(&password, &user.password) {
                        return Err(AuthError::WrongCredentials);
                    }
                    if user.status.blocks_sign_in() {
                        return Ok(TenantSignIn::Blocked(user));
                    }
                    let view = resolve_role_view(store, &user).await?;
                    Ok(TenantSignIn::Allowed(user, view))
                })
            })
            .await?;

        match outcome {
            TenantSignIn::Blocked(user) => Ok(status_outcome(&routing_key, &user)),
            TenantSignIn::Allowed(user, role_view) => {
                // the tenant session is already closed; signing never holds
                // a tenant connection open
                let access_token = self.jwt.sign(&user)?;
                tracing::info!(tenant = %record.name, user = %user.id, "sign-in succeeded");
                Ok(authenticated_outcome(
                    &routing_key,
                    &record,
                    user,
                    role_view,
                    access_token,
                ))
            }
        }
    }
}

/// The `tenant` echoed back is the inbound routing key, not the resolved
/// record's name; under host routing the two differ.
fn status_outcome(routing_key: &str, user: &User) -> SignInOutcome {
    SignInOutcome::Status(StatusResponse {
        message: format!("Your account is {}. Please contact Admin.", user.status),
        tenant: routing_key.to_string(),
    })
}

fn authenticated_outcome(
    routing_key: &str,
    record: &TenantRecord,
    user: User,
    role_view: RoleView,
    access_token: String,
) -> SignInOutcome {
    SignInOutcome::Authenticated(Box::new(SignInResponse {
        reset_password: user.enforce_password_reset != 0,
        access_token,
        tenant: routing_key.to_string(),
        user: SignedInUser {
            uuid: user.id.clone(),
            user_acl: user.acl.clone(),
            role_view,
            feature_restrictions: record.features_restrictions.clone(),
            data: SignedInUserData {
                display_name: user.display_name(),
                email: user.email.clone(),
            },
        },
    }))
}

pub(crate) async fn resolve_role_view(
    store: &mut dyn TenantStore,
    user: &User,
) -> Result<RoleView> {
    match user.role_ids.len() {
        0 => Err(AuthError::NoRolesAssigned),
        1 => {
            let role = store
                .find_role_by_id(&user.role_ids[0])
                .await?
                .ok_or(AuthError::NoRolesAssigned)?;
            // the flattened view exposes the role *type*, not the display
            // name; the name only travels in the multi-role list
            Ok(RoleView::Single {
                role: role.role_type.as_str().to_string(),
                role_id: role.id,
                role_acl: role.acl,
                is_default: role.is_default,
            })
        }
        _ => {
            let roles = store.find_roles_by_ids(&user.role_ids).await?;
            Ok(RoleView::Multiple { roles })
        }
    }
}
