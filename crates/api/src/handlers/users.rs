use crate::error::ApiError;
use crate::handlers::operation_context;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use coral_models::{Page, SearchRequest, User};

pub async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(search): Query<SearchRequest>,
) -> Result<Json<Page<User>>, ApiError> {
    let ctx = operation_context(&state, &headers).await?;
    Ok(Json(state.users.search(&ctx, search).await?))
}
