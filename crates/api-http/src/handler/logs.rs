// Activity Log Handlers

use crate::error::ApiResult;
use crate::extract::{ApiQuery, CurrentUser};
use crate::server::AppState;
use crate::types::ApiResponse;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use folio_core::application::ActivityQuery;

/// Newest-first audit trail
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    ApiQuery(query): ApiQuery<ActivityQuery>,
) -> ApiResult<Response> {
    let page = state.activity.query(query).await?;
    Ok(Json(ApiResponse::paginated(page)).into_response())
}
