// Settings Service - key/value site settings with a short-lived read cache

use crate::application::cache::TtlCache;
use crate::domain::setting::{public_subset, MAINTENANCE_MODE_KEY};
use crate::domain::{Setting, SettingsMap};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, SettingsRepository, TimeProvider};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;

/// How long the settings map is served from memory
pub const SETTINGS_CACHE_TTL_MS: i64 = 60_000;

/// Upsert payload
///
/// `value` distinguishes "absent" (`None`) from an explicit JSON `null` (`Some(Null)`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingInput {
    #[serde(default)]
    pub key: String,
    #[serde(default, deserialize_with = "present")]
    pub value: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Settings Service
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    cache: TtlCache<SettingsMap>,
}

impl SettingsService {
    pub fn new(
        repo: Arc<dyn SettingsRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            repo,
            id_provider,
            cache: TtlCache::new(SETTINGS_CACHE_TTL_MS, time_provider.clone()),
            time_provider,
        }
    }

    pub async fn list(&self, category: Option<String>) -> Result<Vec<Setting>> {
        self.repo.list(category).await
    }

    /// Insert or update a setting by key
    pub async fn save(&self, input: SettingInput) -> Result<Setting> {
        let key = input.key.trim();
        let (false, Some(value)) = (key.is_empty(), input.value) else {
            return Err(AppError::Validation(
                "Key and value are required".to_string(),
            ));
        };

        let now = self.time_provider.now_millis();
        let setting = Setting {
            id: self.id_provider.generate_id(),
            key: key.to_string(),
            value,
            category: input.category,
            description: input.description,
            created_at: now,
            updated_at: now,
        };

        let saved = self.repo.upsert(&setting).await?;
        self.cache.invalidate().await;

        tracing::info!(key = %saved.key, "Setting saved");
        Ok(saved)
    }

    /// Every setting as a key -> value map (cached)
    pub async fn all(&self) -> Result<SettingsMap> {
        if let Some(map) = self.cache.get().await {
            return Ok(map);
        }

        let generation = self.cache.generation().await;
        let map: SettingsMap = self
            .repo
            .list(None)
            .await?
            .into_iter()
            .map(|s| (s.key, s.value))
            .collect();

        // A save that landed during the load has invalidated this snapshot
        self.cache.put_if_current(generation, map.clone()).await;
        Ok(map)
    }

    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.all().await?.remove(key))
    }

    pub async fn get_or(&self, key: &str, default: Value) -> Result<Value> {
        Ok(self.get(key).await?.unwrap_or(default))
    }

    /// key -> value map restricted to one category
    pub async fn by_category(&self, category: &str) -> Result<SettingsMap> {
        Ok(self
            .repo
            .list(Some(category.to_string()))
            .await?
            .into_iter()
            .map(|s| (s.key, s.value))
            .collect())
    }

    /// Allow-listed settings for anonymous readers
    pub async fn public(&self) -> Result<SettingsMap> {
        Ok(public_subset(&self.all().await?))
    }

    /// Accepts `true` or the string `"true"`
    pub async fn maintenance_mode(&self) -> Result<bool> {
        Ok(match self.get(MAINTENANCE_MODE_KEY).await? {
            Some(Value::Bool(flag)) => flag,
            Some(Value::String(s)) => s == "true",
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::id_provider::testing::SequentialIds;
    use crate::port::settings_repository::MockSettingsRepository;
    use crate::port::time_provider::testing::ManualClock;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    /// In-memory repository whose next `list` pauses after taking its snapshot
    #[derive(Default)]
    struct PausingRepo {
        rows: Mutex<Vec<Setting>>,
        paused: Mutex<Option<(oneshot::Sender<()>, oneshot::Receiver<()>)>>,
    }

    #[async_trait]
    impl SettingsRepository for PausingRepo {
        async fn upsert(&self, setting: &Setting) -> Result<Setting> {
            let mut rows = self.rows.lock().unwrap();
            rows.retain(|s| s.key != setting.key);
            rows.push(setting.clone());
            Ok(setting.clone())
        }

        async fn list(&self, _category: Option<String>) -> Result<Vec<Setting>> {
            let snapshot = self.rows.lock().unwrap().clone();
            let pause = self.paused.lock().unwrap().take();
            if let Some((entered, resume)) = pause {
                let _ = entered.send(());
                let _ = resume.await;
            }
            Ok(snapshot)
        }
    }

    fn setting(key: &str, value: Value) -> Setting {
        Setting {
            id: format!("s-{}", key),
            key: key.to_string(),
            value,
            category: None,
            description: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn service(repo: MockSettingsRepository, clock: Arc<ManualClock>) -> SettingsService {
        SettingsService::new(Arc::new(repo), Arc::new(SequentialIds::default()), clock)
    }

    #[test]
    fn test_input_distinguishes_null_from_missing() {
        let with_null: SettingInput =
            serde_json::from_value(json!({"key": "k", "value": null})).unwrap();
        assert_eq!(with_null.value, Some(Value::Null));

        let missing: SettingInput = serde_json::from_value(json!({"key": "k"})).unwrap();
        assert_eq!(missing.value, None);
    }

    #[tokio::test]
    async fn test_save_requires_key_and_value() {
        let svc = service(MockSettingsRepository::new(), Arc::new(ManualClock::new(0)));
        let err = svc
            .save(SettingInput {
                key: "site_name".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "Key and value are required");

        let err = svc
            .save(SettingInput {
                key: "  ".into(),
                value: Some(json!("x")),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_all_is_cached_until_ttl() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_list()
            .times(2)
            .returning(|_| Ok(vec![setting("site_name", json!("Folio"))]));

        let clock = Arc::new(ManualClock::new(0));
        let svc = service(repo, clock.clone());

        svc.all().await.unwrap();
        svc.all().await.unwrap();
        clock.advance(SETTINGS_CACHE_TTL_MS);
        let map = svc.all().await.unwrap();
        assert_eq!(map["site_name"], json!("Folio"));
    }

    #[tokio::test]
    async fn test_save_invalidates_cache() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_list()
            .times(2)
            .returning(|_| Ok(vec![setting("site_name", json!("Folio"))]));
        repo.expect_upsert().returning(|s| Ok(s.clone()));

        let svc = service(repo, Arc::new(ManualClock::new(0)));
        svc.all().await.unwrap();
        svc.save(SettingInput {
            key: "site_name".into(),
            value: Some(json!("Folio 2")),
            ..Default::default()
        })
        .await
        .unwrap();
        svc.all().await.unwrap();
    }

    #[tokio::test]
    async fn test_public_and_maintenance_mode() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_list().returning(|_| {
            Ok(vec![
                setting("site_name", json!("Folio")),
                setting("smtp_password", json!("secret")),
                setting(MAINTENANCE_MODE_KEY, json!("true")),
            ])
        });

        let svc = service(repo, Arc::new(ManualClock::new(0)));
        let public = svc.public().await.unwrap();
        assert!(public.contains_key("site_name"));
        assert!(!public.contains_key("smtp_password"));
        assert!(svc.maintenance_mode().await.unwrap());
        assert_eq!(
            svc.get_or("missing", json!(42)).await.unwrap(),
            json!(42)
        );
    }

    #[tokio::test]
    async fn test_load_racing_a_save_does_not_restore_stale_map() {
        let repo = Arc::new(PausingRepo::default());
        repo.upsert(&setting("site_name", json!("Old"))).await.unwrap();

        let (entered_tx, entered_rx) = oneshot::channel();
        let (resume_tx, resume_rx) = oneshot::channel();
        *repo.paused.lock().unwrap() = Some((entered_tx, resume_rx));

        let svc = Arc::new(SettingsService::new(
            repo.clone(),
            Arc::new(SequentialIds::default()),
            Arc::new(ManualClock::new(0)),
        ));

        // Reader snapshots the old rows, then stalls
        let reader = tokio::spawn({
            let svc = Arc::clone(&svc);
            async move { svc.all().await }
        });
        entered_rx.await.unwrap();

        svc.save(SettingInput {
            key: "site_name".into(),
            value: Some(json!("New")),
            ..Default::default()
        })
        .await
        .unwrap();

        resume_tx.send(()).unwrap();
        let stale = reader.await.unwrap().unwrap();
        assert_eq!(stale["site_name"], json!("Old"));

        assert_eq!(svc.all().await.unwrap()["site_name"], json!("New"));
    }
}
