// Content Domain Model

use crate::domain::media::{Media, MediaId};
use crate::domain::pagination::{PageRequest, SortOrder};
use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Content ID (UUID v4)
pub type ContentId = String;

/// Publication state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Draft,
    Published,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ContentStatus::Draft),
            "published" => Ok(ContentStatus::Published),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }
}

/// Storage kind of a content field value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Richtext,
    Image,
    Gallery,
    Date,
    Number,
    Boolean,
    Select,
}

/// A single typed key/value pair on a content entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentField {
    pub key: String,
    #[serde(default)]
    pub value: Value,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
}

impl ContentField {
    pub fn new(key: impl Into<String>, value: Value, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            value,
            kind,
        }
    }
}

/// SEO and authoring metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<String>,
    #[serde(default)]
    pub seo_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
}

/// A typed content entry (blog post, team member, project, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: ContentId,
    pub content_type: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub fields: Vec<ContentField>,
    pub status: ContentStatus,
    pub metadata: ContentMetadata,
    pub media: Vec<MediaId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Content {
    /// Value of the first field with the given key
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    pub fn is_published(&self) -> bool {
        self.status == ContentStatus::Published
    }
}

/// Content entry with its media references resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentView {
    pub id: ContentId,
    pub content_type: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub fields: Vec<ContentField>,
    pub status: ContentStatus,
    pub metadata: ContentMetadata,
    pub media: Vec<Media>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ContentView {
    pub fn new(content: Content, media: Vec<Media>) -> Self {
        Self {
            id: content.id,
            content_type: content.content_type,
            title: content.title,
            slug: content.slug,
            description: content.description,
            fields: content.fields,
            status: content.status,
            metadata: content.metadata,
            media,
            created_at: content.created_at,
            updated_at: content.updated_at,
        }
    }
}

/// Sortable columns for content listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Slug,
    Status,
}

impl SortField {
    /// Unknown names fall back to `createdAt`
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("updatedAt") => SortField::UpdatedAt,
            Some("title") => SortField::Title,
            Some("slug") => SortField::Slug,
            Some("status") => SortField::Status,
            _ => SortField::CreatedAt,
        }
    }
}

/// Listing criteria for content queries
#[derive(Debug, Clone)]
pub struct ContentFilter {
    pub content_type: String,
    /// Case-insensitive substring over title and description
    pub search: Option<String>,
    pub status: Option<ContentStatus>,
    /// Matches a field `category` with this exact value
    pub category: Option<String>,
    /// Only entries flagged for the homepage
    pub featured: bool,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub page: PageRequest,
}

impl ContentFilter {
    pub fn new(content_type: impl Into<String>, page: PageRequest) -> Self {
        Self {
            content_type: content_type.into(),
            search: None,
            status: None,
            category: None,
            featured: false,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            page,
        }
    }
}

/// Field keys that mark an entry as featured on the homepage
pub const FEATURED_FIELD_KEYS: [&str; 2] = ["featured_homepage", "featured_on_homepage"];
