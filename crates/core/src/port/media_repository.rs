// Media Repository Port (Interface)

use crate::domain::{Media, MediaFilter, MediaId, MediaView};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for media records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn insert(&self, media: &Media) -> Result<()>;

    /// Lookup with the uploader resolved
    async fn find_by_id(&self, id: &str) -> Result<Option<MediaView>>;

    /// Batch lookup; keeps input order and skips unknown ids
    async fn find_by_ids(&self, ids: &[MediaId]) -> Result<Vec<Media>>;

    /// One page of media (newest first) plus the total match count
    async fn list(&self, filter: &MediaFilter) -> Result<(Vec<MediaView>, i64)>;

    /// `true` if a record was removed
    async fn delete(&self, id: &str) -> Result<bool>;
}
