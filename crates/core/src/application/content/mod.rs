// Content Service - typed content entries (admin CRUD + public reads)

use crate::domain::content_type::content_type as registered_type;
use crate::domain::{
    slugify, Content, ContentField, ContentFilter, ContentMetadata, ContentStatus, ContentView,
    DomainError, MediaId, Paginated,
};
use crate::error::{AppError, Result};
use crate::port::{ContentRepository, IdProvider, MediaRepository, TimeProvider};
use serde::Deserialize;
use std::sync::Arc;

#[cfg(test)]
mod content_test;

/// Content type that backs the public homepage
pub const HOMEPAGE_TYPE: &str = "homepage";

const MAX_TYPE_NAME_LEN: usize = 64;

/// Payload for creating an entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Option<Vec<ContentField>>,
    pub status: Option<ContentStatus>,
    pub metadata: Option<ContentMetadata>,
    pub media: Option<Vec<MediaId>>,
}

/// Partial update; absent members are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub fields: Option<Vec<ContentField>>,
    pub status: Option<ContentStatus>,
    pub metadata: Option<ContentMetadata>,
    pub media: Option<Vec<MediaId>>,
}

/// Result of an update
#[derive(Debug, Clone)]
pub struct ContentUpdate {
    pub content: Content,
    pub updated_fields: Vec<&'static str>,
}

/// Content Service
pub struct ContentService {
    repo: Arc<dyn ContentRepository>,
    media: Arc<dyn MediaRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ContentService {
    pub fn new(
        repo: Arc<dyn ContentRepository>,
        media: Arc<dyn MediaRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            repo,
            media,
            id_provider,
            time_provider,
        }
    }

    /// Paginated admin listing (all statuses unless filtered)
    pub async fn list(&self, filter: ContentFilter) -> Result<Paginated<Content>> {
        validate_type_name(&filter.content_type)?;
        let (items, total) = self.repo.list(&filter).await?;
        Ok(Paginated::new(items, filter.page, total))
    }

    pub async fn get(&self, content_type: &str, id: &str) -> Result<ContentView> {
        let content = self
            .repo
            .find_by_id(content_type, id)
            .await?
            .ok_or_else(not_found)?;
        self.with_media(content).await
    }

    /// Lookup by slug; anonymous callers only see published entries
    pub async fn get_by_slug(
        &self,
        content_type: &str,
        slug: &str,
        authenticated: bool,
    ) -> Result<ContentView> {
        let content = self
            .repo
            .find_by_slug(content_type, slug, !authenticated)
            .await?
            .ok_or_else(not_found)?;
        self.with_media(content).await
    }

    /// Create an entry authored by `author_email`
    pub async fn create(
        &self,
        content_type: &str,
        input: ContentInput,
        author_email: &str,
    ) -> Result<Content> {
        validate_type_name(content_type)?;

        let title = input
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Validation("Title is required".to_string()))?;

        let status = input.status.unwrap_or_default();
        let fields = input.fields.unwrap_or_default();
        validate_fields(content_type, &fields, status)?;

        let mut metadata = input.metadata.unwrap_or_default();
        metadata.author = Some(author_email.to_string());

        let now = self.time_provider.now_millis();
        let content = Content {
            id: self.id_provider.generate_id(),
            content_type: content_type.to_string(),
            slug: self.unique_slug(&slugify(&title), None).await?,
            title,
            description: input.description,
            fields,
            status,
            metadata,
            media: input.media.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        self.repo.insert(&content).await?;

        tracing::info!(
            content_id = %content.id,
            content_type = %content.content_type,
            slug = %content.slug,
            "Content created"
        );

        Ok(content)
    }

    /// Apply a partial update
    ///
    /// A changed title regenerates the slug; an explicit slug must be free.
    pub async fn update(
        &self,
        content_type: &str,
        id: &str,
        patch: ContentPatch,
    ) -> Result<ContentUpdate> {
        let mut content = self
            .repo
            .find_by_id(content_type, id)
            .await?
            .ok_or_else(not_found)?;
        let mut updated_fields = Vec::new();

        if let Some(title) = patch.title.map(|t| t.trim().to_string()) {
            if title.is_empty() {
                return Err(AppError::Validation("Title is required".to_string()));
            }
            if title != content.title {
                content.slug = self
                    .unique_slug(&slugify(&title), Some(content.id.clone()))
                    .await?;
                content.title = title;
                updated_fields.push("title");
                updated_fields.push("slug");
            }
        }

        if let Some(slug) = patch.slug {
            let slug = slugify(&slug);
            if slug != content.slug {
                if self
                    .repo
                    .slug_exists(&slug, Some(content.id.clone()))
                    .await?
                {
                    return Err(AppError::Conflict(format!("Slug '{}' is already in use", slug)));
                }
                content.slug = slug;
                if !updated_fields.contains(&"slug") {
                    updated_fields.push("slug");
                }
            }
        }

        if let Some(description) = patch.description {
            content.description = Some(description);
            updated_fields.push("description");
        }
        if let Some(fields) = patch.fields {
            content.fields = fields;
            updated_fields.push("fields");
        }
        if let Some(status) = patch.status {
            content.status = status;
            updated_fields.push("status");
        }
        if let Some(metadata) = patch.metadata {
            // Authorship survives edits
            let author = content.metadata.author.take();
            content.metadata = ContentMetadata {
                author: metadata.author.or(author),
                ..metadata
            };
            updated_fields.push("metadata");
        }
        if let Some(media) = patch.media {
            content.media = media;
            updated_fields.push("media");
        }

        validate_fields(content_type, &content.fields, content.status)?;

        content.updated_at = self.time_provider.now_millis();
        self.repo.update(&content).await?;

        Ok(ContentUpdate {
            content,
            updated_fields,
        })
    }

    pub async fn delete(&self, content_type: &str, id: &str) -> Result<Content> {
        let deleted = self
            .repo
            .delete(content_type, id)
            .await?
            .ok_or_else(not_found)?;

        tracing::info!(content_id = %deleted.id, slug = %deleted.slug, "Content deleted");
        Ok(deleted)
    }

    /// Public listing: published entries only, media resolved
    pub async fn public_list(&self, mut filter: ContentFilter) -> Result<Paginated<ContentView>> {
        validate_type_name(&filter.content_type)?;
        filter.status = Some(ContentStatus::Published);

        let (items, total) = self.repo.list(&filter).await?;
        let mut views = Vec::with_capacity(items.len());
        for content in items {
            views.push(self.with_media(content).await?);
        }
        Ok(Paginated::new(views, filter.page, total))
    }

    pub async fn public_get(&self, content_type: &str, slug: &str) -> Result<ContentView> {
        self.get_by_slug(content_type, slug, false).await
    }

    /// The published homepage entry
    pub async fn homepage(&self) -> Result<ContentView> {
        let content = self
            .repo
            .first_published(HOMEPAGE_TYPE)
            .await?
            .ok_or_else(|| AppError::NotFound("Homepage content not found".to_string()))?;
        self.with_media(content).await
    }

    async fn with_media(&self, content: Content) -> Result<ContentView> {
        let media = if content.media.is_empty() {
            Vec::new()
        } else {
            self.media.find_by_ids(&content.media).await?
        };
        Ok(ContentView::new(content, media))
    }

    /// `base`, or `base-<millis>` when taken
    async fn unique_slug(&self, base: &str, excluding: Option<String>) -> Result<String> {
        if !self.repo.slug_exists(base, excluding.clone()).await? {
            return Ok(base.to_string());
        }
        let candidate = format!("{}-{}", base, self.time_provider.now_millis());
        if self.repo.slug_exists(&candidate, excluding).await? {
            return Err(AppError::Conflict(format!(
                "Slug '{}' is already in use",
                candidate
            )));
        }
        Ok(candidate)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Content not found".to_string())
}

/// Content type names: 1-64 chars of [a-z0-9_-]
pub fn validate_type_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_TYPE_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(DomainError::InvalidContentType(name.to_string()).into())
    }
}

/// Check fields against the registry definition of a known content type
///
/// Number ranges are always enforced; required fields only once the entry is published.
fn validate_fields(content_type: &str, fields: &[ContentField], status: ContentStatus) -> Result<()> {
    let Some(definition) = registered_type(content_type) else {
        return Ok(());
    };

    let publishing = status == ContentStatus::Published;
    let errors: Vec<String> = definition
        .fields
        .iter()
        .filter(|def| publishing || !def.required)
        .filter_map(|def| {
            let value = fields.iter().find(|f| f.key == def.name).map(|f| &f.value);
            // Drafts may leave fields unset entirely
            if !publishing && value.is_none() {
                return None;
            }
            def.validate(value)
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(DomainError::FieldValidation(errors.join("; ")).into())
    }
}
