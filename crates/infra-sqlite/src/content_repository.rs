// SQLite ContentRepository Implementation
// fields / metadata / media live in JSON columns; filters use JSON1

use crate::error::map_sqlx_error;
use crate::sql::{contains_pattern, decode_json, encode_json};
use async_trait::async_trait;
use folio_core::domain::content::FEATURED_FIELD_KEYS;
use folio_core::domain::{
    Content, ContentField, ContentFilter, ContentId, ContentStatus, SortField, SortOrder,
};
use folio_core::error::{AppError, Result};
use folio_core::port::ContentRepository;
use serde_json::Value;
use sqlx::SqlitePool;

/// Shared WHERE clause for list/count
///
/// ?1 type, ?2 status, ?3 search pattern, ?4 category, ?5 featured flag
const LIST_FILTER: &str = r#"
    c.content_type = ?1
    AND (?2 IS NULL OR c.status = ?2)
    AND (?3 IS NULL
         OR lower(c.title) LIKE ?3 ESCAPE '\'
         OR lower(coalesce(c.description, '')) LIKE ?3 ESCAPE '\')
    AND (?4 IS NULL OR EXISTS (
        SELECT 1 FROM json_each(c.fields) f
        WHERE json_extract(f.value, '$.key') = 'category'
          AND json_extract(f.value, '$.value') = ?4))
    AND (?5 = 0 OR EXISTS (
        SELECT 1 FROM json_each(c.fields) f
        WHERE json_extract(f.value, '$.key') IN (?6, ?7)
          AND json_type(f.value, '$.value') = 'true'))
"#;

pub struct SqliteContentRepository {
    pool: SqlitePool,
}

impl SqliteContentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn order_clause(sort_by: SortField, order: SortOrder) -> String {
    let column = match sort_by {
        SortField::CreatedAt => "c.created_at",
        SortField::UpdatedAt => "c.updated_at",
        SortField::Title => "c.title",
        SortField::Slug => "c.slug",
        SortField::Status => "c.status",
    };
    let dir = order.as_sql();
    format!("{} {}, c.id {}", column, dir, dir)
}

#[async_trait]
impl ContentRepository for SqliteContentRepository {
    async fn insert(&self, content: &Content) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO content (
                id, content_type, title, slug, description,
                fields, status, metadata, media, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&content.id)
        .bind(&content.content_type)
        .bind(&content.title)
        .bind(&content.slug)
        .bind(&content.description)
        .bind(encode_json(&content.fields)?)
        .bind(content.status.as_str())
        .bind(encode_json(&content.metadata)?)
        .bind(encode_json(&content.media)?)
        .bind(content.created_at)
        .bind(content.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, content_type: &str, id: &str) -> Result<Option<Content>> {
        let row = sqlx::query_as::<_, ContentRow>(
            "SELECT * FROM content WHERE content_type = ? AND id = ?",
        )
        .bind(content_type)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(ContentRow::into_content).transpose()
    }

    async fn find_by_slug(
        &self,
        content_type: &str,
        slug: &str,
        published_only: bool,
    ) -> Result<Option<Content>> {
        let row = sqlx::query_as::<_, ContentRow>(
            r#"
            SELECT * FROM content
            WHERE content_type = ? AND slug = ?
              AND (? = 0 OR status = 'published')
            "#,
        )
        .bind(content_type)
        .bind(slug)
        .bind(published_only)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(ContentRow::into_content).transpose()
    }

    async fn slug_exists(&self, slug: &str, excluding: Option<ContentId>) -> Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM content WHERE slug = ?1 AND (?2 IS NULL OR id != ?2))",
        )
        .bind(slug)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn update(&self, content: &Content) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE content
            SET title = ?, slug = ?, description = ?, fields = ?,
                status = ?, metadata = ?, media = ?, updated_at = ?
            WHERE id = ? AND content_type = ?
            "#,
        )
        .bind(&content.title)
        .bind(&content.slug)
        .bind(&content.description)
        .bind(encode_json(&content.fields)?)
        .bind(content.status.as_str())
        .bind(encode_json(&content.metadata)?)
        .bind(encode_json(&content.media)?)
        .bind(content.updated_at)
        .bind(&content.id)
        .bind(&content.content_type)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Content not found".to_string()));
        }
        Ok(())
    }

    async fn delete(&self, content_type: &str, id: &str) -> Result<Option<Content>> {
        let row = sqlx::query_as::<_, ContentRow>(
            "DELETE FROM content WHERE content_type = ? AND id = ? RETURNING *",
        )
        .bind(content_type)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(ContentRow::into_content).transpose()
    }

    async fn list(&self, filter: &ContentFilter) -> Result<(Vec<Content>, i64)> {
        let status = filter.status.map(|s| s.as_str());
        let search = contains_pattern(filter.search.as_deref());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM content c WHERE {}",
            LIST_FILTER
        ))
        .bind(&filter.content_type)
        .bind(status)
        .bind(&search)
        .bind(&filter.category)
        .bind(filter.featured)
        .bind(FEATURED_FIELD_KEYS[0])
        .bind(FEATURED_FIELD_KEYS[1])
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let rows = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT c.* FROM content c WHERE {} ORDER BY {} LIMIT ?8 OFFSET ?9",
            LIST_FILTER,
            order_clause(filter.sort_by, filter.sort_order)
        ))
        .bind(&filter.content_type)
        .bind(status)
        .bind(&search)
        .bind(&filter.category)
        .bind(filter.featured)
        .bind(FEATURED_FIELD_KEYS[0])
        .bind(FEATURED_FIELD_KEYS[1])
        .bind(filter.page.limit as i64)
        .bind(filter.page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let items = rows
            .into_iter()
            .map(ContentRow::into_content)
            .collect::<Result<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn count_published(&self, content_type: &str) -> Result<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM content WHERE content_type = ? AND status = 'published'",
        )
        .bind(content_type)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn published_field_values(&self, content_type: &str, key: &str) -> Result<Vec<Value>> {
        let raw: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT f.value FROM content c, json_each(c.fields) f
            WHERE c.content_type = ? AND c.status = 'published'
              AND json_extract(f.value, '$.key') = ?
            "#,
        )
        .bind(content_type)
        .bind(key)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        raw.iter()
            .map(|json| decode_json::<ContentField>("fields", json).map(|f| f.value))
            .collect()
    }

    async fn first_published(&self, content_type: &str) -> Result<Option<Content>> {
        let row = sqlx::query_as::<_, ContentRow>(
            r#"
            SELECT * FROM content
            WHERE content_type = ? AND status = 'published'
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(content_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(ContentRow::into_content).transpose()
    }
}

#[derive(sqlx::FromRow)]
struct ContentRow {
    id: String,
    content_type: String,
    title: String,
    slug: String,
    description: Option<String>,
    fields: String,
    status: String,
    metadata: String,
    media: String,
    created_at: i64,
    updated_at: i64,
}

impl ContentRow {
    fn into_content(self) -> Result<Content> {
        let status: ContentStatus = self.status.parse()?;
        Ok(Content {
            id: self.id,
            content_type: self.content_type,
            title: self.title,
            slug: self.slug,
            description: self.description,
            fields: decode_json("fields", &self.fields)?,
            status,
            metadata: decode_json("metadata", &self.metadata)?,
            media: decode_json("media", &self.media)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use folio_core::domain::{ContentMetadata, FieldKind, PageRequest};
    use serde_json::json;

    fn entry(id: &str, content_type: &str, title: &str, created_at: i64) -> Content {
        Content {
            id: id.to_string(),
            content_type: content_type.to_string(),
            title: title.to_string(),
            slug: folio_core::domain::slugify(title),
            description: None,
            fields: vec![],
            status: ContentStatus::Published,
            metadata: ContentMetadata::default(),
            media: vec![],
            created_at,
            updated_at: created_at,
        }
    }

    async fn setup_repo() -> SqliteContentRepository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteContentRepository::new(pool)
    }

    #[tokio::test]
    async fn test_insert_and_find_round_trips_json_columns() {
        let repo = setup_repo().await;
        let mut content = entry("c1", "projects", "Bridge Renovation", 1);
        content.fields = vec![ContentField::new("year", json!(2021), FieldKind::Number)];
        content.metadata.seo_keywords = vec!["bridge".into()];
        content.media = vec!["m1".into(), "m2".into()];
        repo.insert(&content).await.unwrap();

        let found = repo.find_by_id("projects", "c1").await.unwrap().unwrap();
        assert_eq!(found, content);
        // Type scoping
        assert!(repo.find_by_id("blogs", "c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_conflict() {
        let repo = setup_repo().await;
        repo.insert(&entry("c1", "blogs", "Hello", 1)).await.unwrap();

        let err = repo.insert(&entry("c2", "projects", "Hello", 2)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(repo.slug_exists("hello", None).await.unwrap());
        assert!(!repo.slug_exists("hello", Some("c1".into())).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_slug_respects_published_only() {
        let repo = setup_repo().await;
        let mut draft = entry("c1", "blogs", "Draft Post", 1);
        draft.status = ContentStatus::Draft;
        repo.insert(&draft).await.unwrap();

        assert!(repo.find_by_slug("blogs", "draft-post", true).await.unwrap().is_none());
        assert!(repo.find_by_slug("blogs", "draft-post", false).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_search_sort_and_paginate() {
        let repo = setup_repo().await;
        for (i, title) in ["Alpha", "Beta", "Gamma", "Alphabet"].iter().enumerate() {
            repo.insert(&entry(&format!("c{}", i), "blogs", title, i as i64))
                .await
                .unwrap();
        }
        repo.insert(&entry("other", "projects", "Alpha Project", 9)).await.unwrap();

        let mut filter = ContentFilter::new("blogs", PageRequest::new(Some(1), Some(10), 20));
        filter.search = Some("ALPHA".into());
        let (items, total) = repo.list(&filter).await.unwrap();
        assert_eq!(total, 2);
        // Newest first by default
        assert_eq!(items[0].title, "Alphabet");

        let mut filter = ContentFilter::new("blogs", PageRequest::new(Some(2), Some(3), 20));
        filter.sort_by = SortField::Title;
        filter.sort_order = SortOrder::Asc;
        let (items, total) = repo.list(&filter).await.unwrap();
        assert_eq!(total, 4);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Gamma");
    }

    #[tokio::test]
    async fn test_list_category_and_featured_filters() {
        let repo = setup_repo().await;

        let mut a = entry("a", "projects", "Harbor", 1);
        a.fields = vec![
            ContentField::new("category", json!("Infrastructure"), FieldKind::Select),
            ContentField::new("featured_homepage", json!(true), FieldKind::Boolean),
        ];
        let mut b = entry("b", "projects", "Tower", 2);
        b.fields = vec![
            ContentField::new("category", json!("Residential"), FieldKind::Select),
            ContentField::new("featured_on_homepage", json!(1), FieldKind::Number),
        ];
        let mut c = entry("c", "projects", "Depot", 3);
        c.status = ContentStatus::Draft;
        c.fields = vec![ContentField::new("featured_homepage", json!(true), FieldKind::Boolean)];
        for item in [&a, &b, &c] {
            repo.insert(item).await.unwrap();
        }

        let mut filter = ContentFilter::new("projects", PageRequest::new(None, None, 20));
        filter.category = Some("Infrastructure".into());
        let (items, _) = repo.list(&filter).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a");

        let mut filter = ContentFilter::new("projects", PageRequest::new(None, None, 20));
        filter.featured = true;
        filter.status = Some(ContentStatus::Published);
        let (items, total) = repo.list(&filter).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].id, "a");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = setup_repo().await;
        let mut content = entry("c1", "services", "Design", 1);
        repo.insert(&content).await.unwrap();

        content.title = "Interior Design".into();
        content.updated_at = 5;
        repo.update(&content).await.unwrap();
        assert_eq!(
            repo.find_by_id("services", "c1").await.unwrap().unwrap().title,
            "Interior Design"
        );

        let deleted = repo.delete("services", "c1").await.unwrap().unwrap();
        assert_eq!(deleted.id, "c1");
        assert!(repo.delete("services", "c1").await.unwrap().is_none());

        let err = repo.update(&content).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_published_field_values_and_first_published() {
        let repo = setup_repo().await;
        let mut a = entry("a", "team", "Ana", 2);
        a.fields = vec![ContentField::new("location", json!("Seoul"), FieldKind::Text)];
        let mut b = entry("b", "team", "Bo", 1);
        b.fields = vec![ContentField::new("location", json!("Lisbon"), FieldKind::Text)];
        let mut draft = entry("d", "team", "Dee", 0);
        draft.status = ContentStatus::Draft;
        draft.fields = vec![ContentField::new("location", json!("Oslo"), FieldKind::Text)];
        for item in [&a, &b, &draft] {
            repo.insert(item).await.unwrap();
        }

        let mut values = repo.published_field_values("team", "location").await.unwrap();
        values.sort_by_key(|v| v.to_string());
        assert_eq!(values, vec![json!("Lisbon"), json!("Seoul")]);

        assert_eq!(repo.count_published("team").await.unwrap(), 2);
        assert_eq!(repo.first_published("team").await.unwrap().unwrap().id, "b");
        assert!(repo.first_published("homepage").await.unwrap().is_none());
    }
}
