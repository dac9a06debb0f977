// Content Type Handlers - read-only registry for editors

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiPath, CurrentUser};
use crate::types::ApiResponse;
use axum::response::{IntoResponse, Response};
use axum::Json;
use folio_core::domain::content_type::{content_type, content_types};
use folio_core::error::AppError;

pub async fn list(CurrentUser(_): CurrentUser) -> ApiResult<Response> {
    Ok(Json(ApiResponse::ok(content_types())).into_response())
}

pub async fn get(
    CurrentUser(_): CurrentUser,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Response> {
    let definition = content_type(&name).ok_or_else(|| {
        ApiError::from(AppError::NotFound("Content type not found".to_string()))
    })?;
    Ok(Json(ApiResponse::ok(definition)).into_response())
}
