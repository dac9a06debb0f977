// Public Handlers - unauthenticated reads for the website

use crate::error::ApiResult;
use crate::extract::{ApiPath, ApiQuery};
use crate::server::AppState;
use crate::types::{ApiResponse, ContentListQuery, SiteStatus};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Published entries only; `status` is ignored
pub async fn content_list(
    State(state): State<AppState>,
    ApiPath(content_type): ApiPath<String>,
    ApiQuery(query): ApiQuery<ContentListQuery>,
) -> ApiResult<Response> {
    let page = state
        .content
        .public_list(query.into_filter(&content_type))
        .await?;
    Ok(Json(ApiResponse::paginated(page)).into_response())
}

pub async fn content_get(
    State(state): State<AppState>,
    ApiPath((content_type, slug)): ApiPath<(String, String)>,
) -> ApiResult<Response> {
    let view = state.content.public_get(&content_type, &slug).await?;
    Ok(Json(ApiResponse::ok(view)).into_response())
}

pub async fn homepage(State(state): State<AppState>) -> ApiResult<Response> {
    let view = state.content.homepage().await?;
    Ok(Json(ApiResponse::ok(view)).into_response())
}

pub async fn settings(State(state): State<AppState>) -> ApiResult<Response> {
    let settings = state.settings.public().await?;
    Ok(Json(ApiResponse::ok(settings)).into_response())
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Response> {
    let stats = state.statistics.get().await;
    Ok(Json(ApiResponse::ok(stats)).into_response())
}

pub async fn status(State(state): State<AppState>) -> ApiResult<Response> {
    let maintenance_mode = state.settings.maintenance_mode().await?;
    Ok(Json(ApiResponse::ok(SiteStatus { maintenance_mode })).into_response())
}
