// Content Handlers - admin CRUD over typed entries

use super::{by, note};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser, OptionalUser};
use crate::server::AppState;
use crate::types::{ApiResponse, ContentListQuery};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use folio_core::application::{ContentInput, ContentPatch};
use folio_core::domain::{ActivityAction, ActivityEvent};
use serde_json::json;

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    ApiPath(content_type): ApiPath<String>,
    ApiQuery(query): ApiQuery<ContentListQuery>,
) -> ApiResult<Response> {
    let page = state.content.list(query.into_filter(&content_type)).await?;
    Ok(Json(ApiResponse::paginated(page)).into_response())
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(content_type): ApiPath<String>,
    ApiJson(input): ApiJson<ContentInput>,
) -> ApiResult<Response> {
    let content = state
        .content
        .create(&content_type, input, &user.email)
        .await?;

    let event = by(
        ActivityEvent::content_change(ActivityAction::CreateContent, &content),
        &user,
    );
    let body = ApiResponse::ok(content).with_message("Content created successfully");
    Ok((StatusCode::CREATED, note(event), Json(body)).into_response())
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    ApiPath((content_type, id)): ApiPath<(String, String)>,
) -> ApiResult<Response> {
    let view = state.content.get(&content_type, &id).await?;
    Ok(Json(ApiResponse::ok(view)).into_response())
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath((content_type, id)): ApiPath<(String, String)>,
    ApiJson(patch): ApiJson<ContentPatch>,
) -> ApiResult<Response> {
    let update = state.content.update(&content_type, &id, patch).await?;
    let content = update.content;

    let event = by(
        ActivityEvent::content_change(ActivityAction::UpdateContent, &content).details(json!({
            "contentType": content.content_type,
            "title": content.title,
            "slug": content.slug,
            "status": content.status.as_str(),
            "updatedFields": update.updated_fields,
        })),
        &user,
    );
    let body = ApiResponse::ok(content).with_message("Content updated successfully");
    Ok((note(event), Json(body)).into_response())
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath((content_type, id)): ApiPath<(String, String)>,
) -> ApiResult<Response> {
    let content = state.content.delete(&content_type, &id).await?;

    let event = by(
        ActivityEvent::content_change(ActivityAction::DeleteContent, &content),
        &user,
    );
    let body = ApiResponse::message("Content deleted successfully");
    Ok((note(event), Json(body)).into_response())
}

/// Drafts are only visible to authenticated callers
pub async fn get_by_slug(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    ApiPath((content_type, slug)): ApiPath<(String, String)>,
) -> ApiResult<Response> {
    let view = state
        .content
        .get_by_slug(&content_type, &slug, user.is_some())
        .await?;
    Ok(Json(ApiResponse::ok(view)).into_response())
}
