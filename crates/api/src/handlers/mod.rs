pub mod auth;
pub mod roles;
pub mod users;

use crate::error::ApiError;
use crate::state::AppState;
use axum::http::{header, HeaderMap, StatusCode};
use coral_tenant::{OperationContext, RoutingHint, TenantContext};

pub const TENANT_ID_HEADER: &str = "x-tenant-id";

pub(crate) fn routing_hint(headers: &HeaderMap) -> RoutingHint {
    RoutingHint {
        host: headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        tenant_id_header: headers
            .get(TENANT_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}

/// Resolve the acting tenant for data endpoints from request headers.
pub(crate) async fn operation_context(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<OperationContext, ApiError> {
    let hint = routing_hint(headers);
    let routing_key = state
        .resolver
        .header_routing_key(&hint)
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Tenant not found"))?;
    let record = state
        .directory
        .resolve(&routing_key, state.resolver.lookup_field())
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Tenant not found"))?;
    Ok(OperationContext::new(TenantContext::new(routing_key, record)))
}
