use crate::error::ApiError;
use crate::handlers::routing_hint;
use crate::state::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use coral_auth::{SignInOutcome, SignInRequest};

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SignInRequest>,
) -> Result<Json<SignInOutcome>, ApiError> {
    let hint = routing_hint(&headers);
    let outcome = state.auth.sign_in(&hint, &request).await?;
    Ok(Json(outcome))
}
