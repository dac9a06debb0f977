// Media Domain Model

use crate::domain::pagination::PageRequest;
use crate::domain::user::{UserId, UserRef};
use serde::{Deserialize, Serialize};

/// Media ID (UUID v4)
pub type MediaId = String;

/// An uploaded file held in object storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: MediaId,
    pub filename: String,
    pub original_name: String,
    pub storage_key: String,
    pub url: String,
    pub size: i64,
    pub mime_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub uploaded_by: UserId,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Media {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Media record with its uploader resolved
#[derive(Debug, Clone, Serialize)]
pub struct MediaView {
    #[serde(flatten)]
    pub media: Media,
    pub uploader: Option<UserRef>,
}

/// Listing criteria for the media library
#[derive(Debug, Clone)]
pub struct MediaFilter {
    /// Case-insensitive substring over filename and original name
    pub search: Option<String>,
    /// Case-insensitive MIME prefix, e.g. `image/`
    pub mime_type: Option<String>,
    pub page: PageRequest,
}
