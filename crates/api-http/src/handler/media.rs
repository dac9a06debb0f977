// Media Handlers - multipart upload, listing, deletion

use super::{by, note};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiPath, ApiQuery, CurrentUser};
use crate::server::AppState;
use crate::types::{ApiResponse, MediaListQuery};
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use folio_core::application::UploadInput;
use folio_core::domain::{ActivityAction, ActivityEvent};
use folio_core::error::AppError;

/// Multipart part carrying the file
pub const UPLOAD_FIELD: &str = "file";

const FALLBACK_MIME: &str = "application/octet-stream";

pub async fn upload(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let input = read_upload(multipart?).await?;
    let media = state.media.upload(input, &user.user_id).await?;

    let event = by(
        ActivityEvent::media_change(ActivityAction::UploadMedia, &media),
        &user,
    );
    let body = ApiResponse::ok(media).with_message("File uploaded successfully");
    Ok((StatusCode::CREATED, note(event), Json(body)).into_response())
}

async fn read_upload(mut multipart: Multipart) -> ApiResult<UploadInput> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or(UPLOAD_FIELD).to_string();
        let mime_type = field.content_type().unwrap_or(FALLBACK_MIME).to_string();
        let bytes = field.bytes().await?;

        return Ok(UploadInput {
            original_name,
            mime_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::from(AppError::Validation(
        "No file provided".to_string(),
    )))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    ApiQuery(query): ApiQuery<MediaListQuery>,
) -> ApiResult<Response> {
    let page = state.media.list(query.into_filter()).await?;
    Ok(Json(ApiResponse::paginated(page)).into_response())
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Response> {
    let view = state.media.get(&id).await?;
    Ok(Json(ApiResponse::ok(view)).into_response())
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Response> {
    let media = state.media.delete(&id).await?;

    let event = by(
        ActivityEvent::media_change(ActivityAction::DeleteMedia, &media),
        &user,
    );
    let body = ApiResponse::message("Media deleted successfully");
    Ok((note(event), Json(body)).into_response())
}
