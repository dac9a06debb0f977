// SQLite SettingsRepository Implementation

use crate::error::map_sqlx_error;
use crate::sql::{decode_json, encode_json};
use async_trait::async_trait;
use folio_core::domain::Setting;
use folio_core::error::Result;
use folio_core::port::SettingsRepository;
use sqlx::SqlitePool;

pub struct SqliteSettingsRepository {
    pool: SqlitePool,
}

impl SqliteSettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepository {
    async fn upsert(&self, setting: &Setting) -> Result<Setting> {
        // Existing rows keep their id and created_at
        let row = sqlx::query_as::<_, SettingRow>(
            r#"
            INSERT INTO settings (id, key, value, category, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                category = COALESCE(excluded.category, settings.category),
                description = COALESCE(excluded.description, settings.description),
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(&setting.id)
        .bind(&setting.key)
        .bind(encode_json(&setting.value)?)
        .bind(&setting.category)
        .bind(&setting.description)
        .bind(setting.created_at)
        .bind(setting.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.into_setting()
    }

    async fn list(&self, category: Option<String>) -> Result<Vec<Setting>> {
        let rows = sqlx::query_as::<_, SettingRow>(
            "SELECT * FROM settings WHERE (?1 IS NULL OR category = ?1) ORDER BY key ASC",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(SettingRow::into_setting).collect()
    }
}

#[derive(sqlx::FromRow)]
struct SettingRow {
    id: String,
    key: String,
    value: String,
    category: Option<String>,
    description: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl SettingRow {
    fn into_setting(self) -> Result<Setting> {
        Ok(Setting {
            value: decode_json("value", &self.value)?,
            id: self.id,
            key: self.key,
            category: self.category,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use serde_json::{json, Value};

    fn setting(id: &str, key: &str, value: Value, category: Option<&str>, at: i64) -> Setting {
        Setting {
            id: id.to_string(),
            key: key.to_string(),
            value,
            category: category.map(str::to_string),
            description: None,
            created_at: at,
            updated_at: at,
        }
    }

    async fn setup_repo() -> SqliteSettingsRepository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteSettingsRepository::new(pool)
    }

    #[tokio::test]
    async fn test_upsert_updates_by_key_and_keeps_category() {
        let repo = setup_repo().await;
        repo.upsert(&setting("s1", "site_name", json!("Folio"), Some("general"), 1))
            .await
            .unwrap();

        let saved = repo
            .upsert(&setting("s2", "site_name", json!("Folio CMS"), None, 2))
            .await
            .unwrap();
        assert_eq!(saved.id, "s1");
        assert_eq!(saved.value, json!("Folio CMS"));
        assert_eq!(saved.category.as_deref(), Some("general"));
        assert_eq!(saved.created_at, 1);
        assert_eq!(saved.updated_at, 2);
    }

    #[tokio::test]
    async fn test_null_and_structured_values() {
        let repo = setup_repo().await;
        repo.upsert(&setting("s1", "hero", json!({"title": "Hi", "cta": [1, 2]}), None, 1))
            .await
            .unwrap();
        repo.upsert(&setting("s2", "banner", Value::Null, None, 1))
            .await
            .unwrap();

        let all = repo.list(None).await.unwrap();
        let keys: Vec<_> = all.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["banner", "hero"]);
        assert_eq!(all[0].value, Value::Null);
        assert_eq!(all[1].value["cta"], json!([1, 2]));
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let repo = setup_repo().await;
        repo.upsert(&setting("s1", "site_name", json!("Folio"), Some("general"), 1))
            .await
            .unwrap();
        repo.upsert(&setting("s2", "social_github", json!("folio"), Some("social"), 1))
            .await
            .unwrap();

        let social = repo.list(Some("social".into())).await.unwrap();
        assert_eq!(social.len(), 1);
        assert_eq!(social[0].key, "social_github");
    }
}
