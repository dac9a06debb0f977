// SQLite MediaRepository Implementation

use crate::error::map_sqlx_error;
use crate::sql::{contains_pattern, encode_json, prefix_pattern};
use async_trait::async_trait;
use folio_core::domain::{Media, MediaFilter, MediaId, MediaView, UserRef};
use folio_core::error::Result;
use folio_core::port::MediaRepository;
use sqlx::SqlitePool;
use std::collections::HashMap;

const SELECT_WITH_UPLOADER: &str = r#"
    SELECT m.*, u.email AS uploader_email
    FROM media m
    LEFT JOIN users u ON u.id = m.uploaded_by
"#;

/// ?1 search pattern, ?2 MIME prefix pattern
const LIST_FILTER: &str = r#"
    (?1 IS NULL
     OR lower(m.filename) LIKE ?1 ESCAPE '\'
     OR lower(m.original_name) LIKE ?1 ESCAPE '\')
    AND (?2 IS NULL OR lower(m.mime_type) LIKE ?2 ESCAPE '\')
"#;

pub struct SqliteMediaRepository {
    pool: SqlitePool,
}

impl SqliteMediaRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaRepository for SqliteMediaRepository {
    async fn insert(&self, media: &Media) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO media (
                id, filename, original_name, storage_key, url, size, mime_type,
                width, height, uploaded_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&media.id)
        .bind(&media.filename)
        .bind(&media.original_name)
        .bind(&media.storage_key)
        .bind(&media.url)
        .bind(media.size)
        .bind(&media.mime_type)
        .bind(media.width.map(i64::from))
        .bind(media.height.map(i64::from))
        .bind(&media.uploaded_by)
        .bind(media.created_at)
        .bind(media.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<MediaView>> {
        let row = sqlx::query_as::<_, MediaRow>(&format!(
            "{} WHERE m.id = ?",
            SELECT_WITH_UPLOADER
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(MediaRow::into_view))
    }

    async fn find_by_ids(&self, ids: &[MediaId]) -> Result<Vec<Media>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, MediaRow>(&format!(
            "{} WHERE m.id IN (SELECT value FROM json_each(?))",
            SELECT_WITH_UPLOADER
        ))
        .bind(encode_json(&ids)?)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut by_id: HashMap<String, Media> = rows
            .into_iter()
            .map(|row| {
                let media = row.into_view().media;
                (media.id.clone(), media)
            })
            .collect();

        // Keep caller order; duplicates resolve once
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn list(&self, filter: &MediaFilter) -> Result<(Vec<MediaView>, i64)> {
        let search = contains_pattern(filter.search.as_deref());
        let mime = prefix_pattern(filter.mime_type.as_deref());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM media m WHERE {}",
            LIST_FILTER
        ))
        .bind(&search)
        .bind(&mime)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let rows = sqlx::query_as::<_, MediaRow>(&format!(
            "{} WHERE {} ORDER BY m.created_at DESC, m.id DESC LIMIT ?3 OFFSET ?4",
            SELECT_WITH_UPLOADER, LIST_FILTER
        ))
        .bind(&search)
        .bind(&mime)
        .bind(filter.page.limit as i64)
        .bind(filter.page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok((rows.into_iter().map(MediaRow::into_view).collect(), total))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM media WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct MediaRow {
    id: String,
    filename: String,
    original_name: String,
    storage_key: String,
    url: String,
    size: i64,
    mime_type: String,
    width: Option<i64>,
    height: Option<i64>,
    uploaded_by: String,
    created_at: i64,
    updated_at: i64,
    uploader_email: Option<String>,
}

impl MediaRow {
    fn into_view(self) -> MediaView {
        let uploader = self.uploader_email.map(|email| UserRef {
            id: self.uploaded_by.clone(),
            email,
        });

        MediaView {
            media: Media {
                id: self.id,
                filename: self.filename,
                original_name: self.original_name,
                storage_key: self.storage_key,
                url: self.url,
                size: self.size,
                mime_type: self.mime_type,
                width: self.width.and_then(|w| u32::try_from(w).ok()),
                height: self.height.and_then(|h| u32::try_from(h).ok()),
                uploaded_by: self.uploaded_by,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            uploader,
        }
    }
}
