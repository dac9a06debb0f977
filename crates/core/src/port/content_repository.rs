// Content Repository Port (Interface)

use crate::domain::{Content, ContentFilter, ContentId};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Repository interface for content entries
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Insert a new entry (Conflict if the slug is taken)
    async fn insert(&self, content: &Content) -> Result<()>;

    async fn find_by_id(&self, content_type: &str, id: &str) -> Result<Option<Content>>;

    async fn find_by_slug(
        &self,
        content_type: &str,
        slug: &str,
        published_only: bool,
    ) -> Result<Option<Content>>;

    /// Whether any entry (of any type) uses the slug, ignoring `excluding`
    async fn slug_exists(&self, slug: &str, excluding: Option<ContentId>) -> Result<bool>;

    /// Persist all mutable columns of an existing entry
    async fn update(&self, content: &Content) -> Result<()>;

    /// Delete and return the removed entry
    async fn delete(&self, content_type: &str, id: &str) -> Result<Option<Content>>;

    /// One page of entries plus the total match count
    async fn list(&self, filter: &ContentFilter) -> Result<(Vec<Content>, i64)>;

    async fn count_published(&self, content_type: &str) -> Result<i64>;

    /// Values of field `key` across published entries of a type
    async fn published_field_values(&self, content_type: &str, key: &str) -> Result<Vec<Value>>;

    /// Oldest published entry of a type
    async fn first_published(&self, content_type: &str) -> Result<Option<Content>>;
}
