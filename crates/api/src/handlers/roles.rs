use crate::error::ApiError;
use crate::handlers::operation_context;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use coral_models::{Page, Role, RoleUsersRow, SearchRequest};

pub async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(search): Query<SearchRequest>,
) -> Result<Json<Page<Role>>, ApiError> {
    let ctx = operation_context(&state, &headers).await?;
    Ok(Json(state.roles.search(&ctx, search).await?))
}

pub async fn users_by_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(search): Query<SearchRequest>,
) -> Result<Json<Page<RoleUsersRow>>, ApiError> {
    let ctx = operation_context(&state, &headers).await?;
    Ok(Json(state.roles.users_by_role(&ctx, search).await?))
}
