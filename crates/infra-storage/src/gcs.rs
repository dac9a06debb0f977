// Google Cloud Storage media store (JSON API)

use async_trait::async_trait;
use folio_core::error::{AppError, Result};
use folio_core::port::MediaStorage;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;

pub const GCS_API_BASE: &str = "https://storage.googleapis.com";
pub const GCS_PUBLIC_BASE: &str = "https://storage.googleapis.com";

#[derive(Debug, Clone)]
pub struct GcsConfig {
    pub bucket: String,
    /// OAuth2 bearer token with write access to the bucket
    pub access_token: Option<String>,
    /// API endpoint (overridable for emulators)
    pub api_base: String,
    /// Base for public object URLs; defaults to `{GCS_PUBLIC_BASE}/{bucket}`
    pub public_base_url: Option<String>,
}

impl GcsConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            access_token: None,
            api_base: GCS_API_BASE.to_string(),
            public_base_url: None,
        }
    }
}

pub struct GcsMediaStore {
    client: Client,
    config: GcsConfig,
}

impl GcsMediaStore {
    pub fn new(config: GcsConfig) -> Result<Self> {
        if config.bucket.trim().is_empty() {
            return Err(AppError::Config("GCS bucket is required".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::Storage(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| AppError::Config(format!("Invalid GCS API base: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config("GCS API base cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn object_url(&self, key: &str) -> String {
        let base = self
            .config
            .public_base_url
            .clone()
            .unwrap_or_else(|| format!("{}/{}", GCS_PUBLIC_BASE, self.config.bucket));
        crate::public_url(&base, key)
    }
}

#[async_trait]
impl MediaStorage for GcsMediaStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let url = self.endpoint(&["upload", "storage", "v1", "b", &self.config.bucket, "o"])?;
        let request = self
            .client
            .post(url)
            .query(&[("uploadType", "media"), ("name", key)])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("GCS upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "GCS upload of {} returned {}: {}",
                key, status, body
            )));
        }

        tracing::debug!(key = %key, bucket = %self.config.bucket, "Uploaded media object");
        Ok(self.object_url(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        // The object name is a single (percent-encoded) path segment
        let url = self.endpoint(&["storage", "v1", "b", &self.config.bucket, "o", key])?;
        let response = self
            .authorize(self.client.delete(url))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("GCS delete failed: {}", e)))?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()),
            s => Err(AppError::Storage(format!(
                "GCS delete of {} returned {}",
                key, s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_bytes, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> GcsMediaStore {
        GcsMediaStore::new(GcsConfig {
            bucket: "folio-media".into(),
            access_token: Some("ya29.token".into()),
            api_base: server.uri(),
            public_base_url: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_put_uploads_media_and_returns_public_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/storage/v1/b/folio-media/o"))
            .and(query_param("uploadType", "media"))
            .and(query_param("name", "media/2024/03/1-abc-logo.png"))
            .and(header("authorization", "Bearer ya29.token"))
            .and(header("content-type", "image/png"))
            .and(body_bytes(vec![7, 8, 9]))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let url = store(&server)
            .put("media/2024/03/1-abc-logo.png", vec![7, 8, 9], "image/png")
            .await
            .unwrap();
        assert_eq!(
            url,
            "https://storage.googleapis.com/folio-media/media/2024/03/1-abc-logo.png"
        );
    }

    #[tokio::test]
    async fn test_put_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = store(&server)
            .put("media/x.png", vec![1], "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(msg) if msg.contains("403")));
    }

    #[tokio::test]
    async fn test_delete_encodes_key_and_ignores_missing() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/storage/v1/b/folio-media/o/media%2F2024%2F03%2Fa.png"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/storage/v1/b/folio-media/o/media%2Fgone.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = store(&server);
        store.delete("media/2024/03/a.png").await.unwrap();
        store.delete("media/gone.png").await.unwrap();
    }

    #[test]
    fn test_requires_bucket() {
        assert!(GcsMediaStore::new(GcsConfig::new("  ")).is_err());
    }
}
