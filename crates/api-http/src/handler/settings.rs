// Settings Handlers - admin listing and upsert

use super::{by, note};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery, CurrentUser};
use crate::server::AppState;
use crate::types::{ApiResponse, SettingsQuery};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use folio_core::application::SettingInput;
use folio_core::domain::ActivityEvent;

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    ApiQuery(query): ApiQuery<SettingsQuery>,
) -> ApiResult<Response> {
    let category = query.category.filter(|c| !c.is_empty());
    let settings = state.settings.list(category).await?;
    Ok(Json(ApiResponse::ok(settings)).into_response())
}

pub async fn save(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<SettingInput>,
) -> ApiResult<Response> {
    let setting = state.settings.save(input).await?;

    let event = by(
        ActivityEvent::settings_change(&setting.key, setting.category.as_deref()),
        &user,
    );
    let body = ApiResponse::ok(setting).with_message("Setting saved successfully");
    Ok((note(event), Json(body)).into_response())
}
