// Media Service - uploads into object storage plus the media library

use crate::domain::{Media, MediaFilter, MediaView, Paginated};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, MediaInspector, MediaRepository, MediaStorage, TimeProvider};
use chrono::{DateTime, Datelike};
use std::sync::Arc;
use tracing::{info, warn};

/// Default upload cap (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// A file received from a client
#[derive(Debug, Clone)]
pub struct UploadInput {
    pub original_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Media Service
pub struct MediaService {
    repo: Arc<dyn MediaRepository>,
    storage: Arc<dyn MediaStorage>,
    inspector: Arc<dyn MediaInspector>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    max_upload_bytes: u64,
}

impl MediaService {
    pub fn new(
        repo: Arc<dyn MediaRepository>,
        storage: Arc<dyn MediaStorage>,
        inspector: Arc<dyn MediaInspector>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            repo,
            storage,
            inspector,
            id_provider,
            time_provider,
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Store a file and record it in the library
    pub async fn upload(&self, input: UploadInput, uploader: &str) -> Result<Media> {
        if input.bytes.is_empty() {
            return Err(AppError::Validation("No file provided".to_string()));
        }
        let size = input.bytes.len() as u64;
        if size > self.max_upload_bytes {
            return Err(AppError::Validation(format!(
                "File exceeds the maximum upload size of {} bytes",
                self.max_upload_bytes
            )));
        }

        let mime_type = if input.mime_type.trim().is_empty() {
            "application/octet-stream".to_string()
        } else {
            input.mime_type.trim().to_ascii_lowercase()
        };

        let (width, height) = if mime_type.starts_with("image/") {
            match self.inspector.dimensions(&input.bytes, &mime_type) {
                Some((w, h)) => (Some(w), Some(h)),
                None => {
                    warn!(name = %input.original_name, "Could not read image dimensions");
                    (None, None)
                }
            }
        } else {
            (None, None)
        };

        let now = self.time_provider.now_millis();
        let id = self.id_provider.generate_id();
        let key = storage_key(&input.original_name, now, &id);
        let filename = key.rsplit('/').next().unwrap_or(&key).to_string();

        let url = self.storage.put(&key, input.bytes, &mime_type).await?;

        let media = Media {
            id,
            filename,
            original_name: input.original_name,
            storage_key: key,
            url,
            size: size as i64,
            mime_type,
            width,
            height,
            uploaded_by: uploader.to_string(),
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.repo.insert(&media).await {
            // Don't leave an orphaned object behind
            if let Err(cleanup) = self.storage.delete(&media.storage_key).await {
                warn!(key = %media.storage_key, error = %cleanup, "Failed to remove orphaned upload");
            }
            return Err(e);
        }

        info!(media_id = %media.id, key = %media.storage_key, size = media.size, "Media uploaded");
        Ok(media)
    }

    pub async fn list(&self, filter: MediaFilter) -> Result<Paginated<MediaView>> {
        let (items, total) = self.repo.list(&filter).await?;
        Ok(Paginated::new(items, filter.page, total))
    }

    pub async fn get(&self, id: &str) -> Result<MediaView> {
        self.repo.find_by_id(id).await?.ok_or_else(not_found)
    }

    /// Remove from storage (best effort) and from the library
    pub async fn delete(&self, id: &str) -> Result<Media> {
        let media = self.repo.find_by_id(id).await?.ok_or_else(not_found)?.media;

        if let Err(e) = self.storage.delete(&media.storage_key).await {
            warn!(key = %media.storage_key, error = %e, "Storage delete failed; removing record anyway");
        }

        if !self.repo.delete(id).await? {
            return Err(not_found());
        }

        info!(media_id = %media.id, "Media deleted");
        Ok(media)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Media not found".to_string())
}

/// `media/{YYYY}/{MM}/{millis}-{token}-{name}`
///
/// `token` is the first 8 alphanumerics of the record id.
pub fn storage_key(original_name: &str, now_millis: i64, id: &str) -> String {
    let (year, month) = DateTime::from_timestamp_millis(now_millis)
        .map(|dt| (dt.year(), dt.month()))
        .unwrap_or((1970, 1));
    let token: String = id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(8)
        .collect();

    format!(
        "media/{:04}/{:02}/{}-{}-{}",
        year,
        month,
        now_millis,
        token,
        sanitize_filename(original_name)
    )
}

/// Lowercase, `[a-z0-9._-]` only, no leading dots, never empty
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches(|c| c == '-' || c == '.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}
