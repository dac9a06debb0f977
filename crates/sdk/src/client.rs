//! Folio Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{
    ActivityLog, Content, ContentInput, ContentPatch, ContentQuery, Envelope, LogQuery,
    LoginResult, Media, MediaQuery, Page, RegisterRequest, Session, Setting, SettingInput,
    SettingsMap, SiteStatistics, SiteStatus, UserEnvelope, UserProfile, UserSummary,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Folio CMS Client
///
/// Holds the current session. Authenticated calls send
/// `Authorization: Bearer <access>`; a 401 triggers exactly one refresh and
/// one retry of the original request.
///
/// # Example
///
/// ```no_run
/// use folio_sdk::FolioClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = FolioClient::connect("http://127.0.0.1:8080").await?;
/// client.login("admin@example.com", "correct-horse-battery").await?;
/// let me = client.me().await?;
/// println!("Logged in as {}", me.email);
/// # Ok(())
/// # }
/// ```
pub struct FolioClient {
    http: Client,
    base: Url,
    session: RwLock<Option<Session>>,
    // Serializes refreshes so concurrent 401s rotate the token only once
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for FolioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolioClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl FolioClient {
    /// Connect to a Folio server
    ///
    /// # Arguments
    ///
    /// * `url` - Server base URL (e.g., `http://127.0.0.1:8080`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();
        let base = Url::parse(url).map_err(|e| SdkError::InvalidUrl(format!("{}: {}", url, e)))?;
        if base.cannot_be_a_base() {
            return Err(SdkError::InvalidUrl(url.to_string()));
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            http,
            base,
            session: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Start from previously saved tokens
    pub fn with_session(self, session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
            ..self
        }
    }

    /// Current tokens (rotated ones included)
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub async fn set_session(&self, session: Option<Session>) {
        *self.session.write().await = session;
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// Log in and keep the issued session
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult> {
        let url = self.endpoint(&["api", "auth", "login"])?;
        let body = json!({ "email": email, "password": password });
        let response = self.http.post(url).json(&body).send().await?;
        let result: LoginResult = data(decode(response).await?)?;

        self.set_session(Some(Session {
            access_token: result.access_token.clone(),
            refresh_token: result.refresh_token.clone(),
        }))
        .await;
        Ok(result)
    }

    /// Register a user (sends the session when there is one)
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserSummary> {
        let url = self.endpoint(&["api", "auth", "register"])?;
        let envelope: Envelope<UserEnvelope<UserSummary>> = self
            .call(|| Ok(self.http.post(url.clone()).json(request)))
            .await?;
        Ok(data(envelope)?.user)
    }

    /// Rotate the session tokens now
    pub async fn refresh(&self) -> Result<Session> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Revoke the refresh token server-side and forget the session
    pub async fn logout(&self) -> Result<()> {
        let Some(session) = self.session().await else {
            return Ok(());
        };

        let url = self.endpoint(&["api", "auth", "logout"])?;
        let body = json!({ "refreshToken": session.refresh_token });
        let result = self
            .call::<Value, _>(|| Ok(self.http.post(url.clone()).json(&body)))
            .await;
        self.set_session(None).await;

        match result {
            Ok(_) | Err(SdkError::Unauthorized) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Revoke every session of the logged-in user and forget this one
    pub async fn logout_everywhere(&self) -> Result<()> {
        if self.session().await.is_none() {
            return Err(SdkError::Unauthorized);
        }

        let url = self.endpoint(&["api", "auth", "logout"])?;
        let body = json!({ "allSessions": true });
        let result = self
            .call::<Value, _>(|| Ok(self.http.post(url.clone()).json(&body)))
            .await;
        self.set_session(None).await;
        result.map(|_| ())
    }

    pub async fn me(&self) -> Result<UserProfile> {
        let url = self.endpoint(&["api", "auth", "me"])?;
        let envelope: Envelope<UserEnvelope<UserProfile>> =
            self.call(|| Ok(self.http.get(url.clone()))).await?;
        Ok(data(envelope)?.user)
    }

    // ========================================================================
    // Content
    // ========================================================================

    pub async fn list_content(
        &self,
        content_type: &str,
        query: &ContentQuery,
    ) -> Result<Page<Content>> {
        let url = self.endpoint(&["api", "content", content_type])?;
        page(self.call(|| Ok(self.http.get(url.clone()).query(query))).await?)
    }

    pub async fn get_content(&self, content_type: &str, id: &str) -> Result<Content> {
        let url = self.endpoint(&["api", "content", content_type, id])?;
        data(self.call(|| Ok(self.http.get(url.clone()))).await?)
    }

    pub async fn get_content_by_slug(&self, content_type: &str, slug: &str) -> Result<Content> {
        let url = self.endpoint(&["api", "content", content_type, "slug", slug])?;
        data(self.call(|| Ok(self.http.get(url.clone()))).await?)
    }

    pub async fn create_content(&self, content_type: &str, input: &ContentInput) -> Result<Content> {
        let url = self.endpoint(&["api", "content", content_type])?;
        data(self.call(|| Ok(self.http.post(url.clone()).json(input))).await?)
    }

    pub async fn update_content(
        &self,
        content_type: &str,
        id: &str,
        patch: &ContentPatch,
    ) -> Result<Content> {
        let url = self.endpoint(&["api", "content", content_type, id])?;
        data(self.call(|| Ok(self.http.put(url.clone()).json(patch))).await?)
    }

    pub async fn delete_content(&self, content_type: &str, id: &str) -> Result<()> {
        let url = self.endpoint(&["api", "content", content_type, id])?;
        self.call::<Value, _>(|| Ok(self.http.delete(url.clone())))
            .await
            .map(|_| ())
    }

    /// Registered content types with their field schemas
    pub async fn content_types(&self) -> Result<Vec<Value>> {
        let url = self.endpoint(&["api", "content-types"])?;
        data(self.call(|| Ok(self.http.get(url.clone()))).await?)
    }

    pub async fn content_type(&self, name: &str) -> Result<Value> {
        let url = self.endpoint(&["api", "content-types", name])?;
        data(self.call(|| Ok(self.http.get(url.clone()))).await?)
    }

    // ========================================================================
    // Media
    // ========================================================================

    pub async fn upload_media(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Media> {
        let url = self.endpoint(&["api", "media", "upload"])?;
        data(
            self.call(|| {
                let part = Part::bytes(bytes.clone())
                    .file_name(file_name.to_string())
                    .mime_str(mime_type)
                    .map_err(|e| SdkError::Other(format!("Invalid MIME type: {}", e)))?;
                Ok(self
                    .http
                    .post(url.clone())
                    .multipart(Form::new().part("file", part)))
            })
            .await?,
        )
    }

    pub async fn list_media(&self, query: &MediaQuery) -> Result<Page<Media>> {
        let url = self.endpoint(&["api", "media"])?;
        page(self.call(|| Ok(self.http.get(url.clone()).query(query))).await?)
    }

    pub async fn get_media(&self, id: &str) -> Result<Media> {
        let url = self.endpoint(&["api", "media", id])?;
        data(self.call(|| Ok(self.http.get(url.clone()))).await?)
    }

    pub async fn delete_media(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&["api", "media", id])?;
        self.call::<Value, _>(|| Ok(self.http.delete(url.clone())))
            .await
            .map(|_| ())
    }

    // ========================================================================
    // Settings & logs
    // ========================================================================

    pub async fn list_settings(&self, category: Option<&str>) -> Result<Vec<Setting>> {
        let url = self.endpoint(&["api", "settings"])?;
        let query: Vec<(&str, &str)> = category.map(|c| ("category", c)).into_iter().collect();
        data(self.call(|| Ok(self.http.get(url.clone()).query(&query))).await?)
    }

    pub async fn save_setting(&self, input: &SettingInput) -> Result<Setting> {
        let url = self.endpoint(&["api", "settings"])?;
        data(self.call(|| Ok(self.http.post(url.clone()).json(input))).await?)
    }

    pub async fn logs(&self, query: &LogQuery) -> Result<Page<ActivityLog>> {
        let url = self.endpoint(&["api", "logs"])?;
        page(self.call(|| Ok(self.http.get(url.clone()).query(query))).await?)
    }

    // ========================================================================
    // Public (no session needed)
    // ========================================================================

    pub async fn public_content(
        &self,
        content_type: &str,
        query: &ContentQuery,
    ) -> Result<Page<Content>> {
        let url = self.endpoint(&["api", "public", "content", content_type])?;
        page(self.public(self.http.get(url).query(query)).await?)
    }

    pub async fn public_content_item(&self, content_type: &str, slug: &str) -> Result<Content> {
        let url = self.endpoint(&["api", "public", "content", content_type, slug])?;
        data(self.public(self.http.get(url)).await?)
    }

    pub async fn homepage(&self) -> Result<Content> {
        let url = self.endpoint(&["api", "public", "content", "homepage"])?;
        data(self.public(self.http.get(url)).await?)
    }

    pub async fn public_settings(&self) -> Result<SettingsMap> {
        let url = self.endpoint(&["api", "public", "settings"])?;
        data(self.public(self.http.get(url)).await?)
    }

    pub async fn stats(&self) -> Result<SiteStatistics> {
        let url = self.endpoint(&["api", "public", "stats"])?;
        data(self.public(self.http.get(url)).await?)
    }

    pub async fn status(&self) -> Result<SiteStatus> {
        let url = self.endpoint(&["api", "public", "status"])?;
        data(self.public(self.http.get(url)).await?)
    }

    /// Liveness check
    pub async fn health(&self) -> Result<Value> {
        let url = self.endpoint(&["health"])?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(SdkError::Api {
                status: response.status().as_u16(),
                message: "Health check failed".to_string(),
            });
        }
        Ok(response.json().await?)
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    /// Append encoded path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SdkError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    async fn public<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Envelope<T>> {
        decode(request.send().await?).await
    }

    /// Authenticated request with one refresh-and-retry on 401
    ///
    /// `build` is called again for the retry, so bodies are rebuilt.
    async fn call<T, F>(&self, build: F) -> Result<Envelope<T>>
    where
        T: DeserializeOwned,
        F: Fn() -> Result<RequestBuilder>,
    {
        let token = self.access_token().await;
        let response = dispatch(build()?, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return decode(response).await;
        }

        let Some(stale) = token else {
            return Err(SdkError::Unauthorized);
        };
        tracing::debug!("Access token rejected, refreshing session");
        self.refresh_after(&stale).await?;

        let token = self.access_token().await;
        let response = dispatch(build()?, token.as_deref()).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(SdkError::Unauthorized);
        }
        decode(response).await
    }

    /// Refresh unless another caller already replaced `stale`
    async fn refresh_after(&self, stale: &str) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        if self.access_token().await.as_deref() != Some(stale) {
            return Ok(());
        }
        self.refresh_locked().await.map(|_| ())
    }

    /// Caller must hold `refresh_lock`
    async fn refresh_locked(&self) -> Result<Session> {
        let Some(refresh_token) = self.session().await.map(|s| s.refresh_token) else {
            return Err(SdkError::Unauthorized);
        };

        let url = self.endpoint(&["api", "auth", "refresh"])?;
        let body = json!({ "refreshToken": refresh_token });
        let response = self.http.post(url).json(&body).send().await?;

        match decode::<Session>(response).await.and_then(data) {
            Ok(session) => {
                self.set_session(Some(session.clone())).await;
                Ok(session)
            }
            // Only a verdict on the token itself ends the session; 429 and 5xx are transient
            Err(SdkError::Api { status, message }) if refresh_rejected(status) => {
                tracing::debug!(status, message = %message, "Session refresh rejected");
                self.set_session(None).await;
                Err(SdkError::Unauthorized)
            }
            Err(e) => Err(e),
        }
    }
}

fn refresh_rejected(status: u16) -> bool {
    matches!(status, 400 | 401 | 403)
}

async fn dispatch(request: RequestBuilder, token: Option<&str>) -> Result<Response> {
    let request = match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    };
    Ok(request.send().await?)
}

/// Parse the envelope, turning error statuses into `SdkError::Api`
async fn decode<T: DeserializeOwned>(response: Response) -> Result<Envelope<T>> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<Envelope<Value>>(&bytes)
            .ok()
            .and_then(|e| e.error.or(e.message))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
        return Err(SdkError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_slice(&bytes)?)
}

fn data<T>(envelope: Envelope<T>) -> Result<T> {
    envelope
        .data
        .ok_or_else(|| SdkError::Other("Response carried no data".to_string()))
}

fn page<T>(envelope: Envelope<Vec<T>>) -> Result<Page<T>> {
    let pagination = envelope
        .pagination
        .ok_or_else(|| SdkError::Other("Response carried no pagination".to_string()))?;
    Ok(Page {
        items: envelope.data.unwrap_or_default(),
        pagination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session(access: &str, refresh: &str) -> Session {
        Session {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        }
    }

    fn me_body() -> Value {
        json!({
            "success": true,
            "data": { "user": {
                "id": "u1", "email": "admin@example.com", "role": "super-admin",
                "lastLogin": null, "createdAt": 1
            }}
        })
    }

    fn unauthorized() -> ResponseTemplate {
        ResponseTemplate::new(401).set_body_json(json!({ "success": false, "error": "Unauthorized" }))
    }

    async fn client_for(server: &MockServer) -> FolioClient {
        FolioClient::connect(server.uri()).await.unwrap()
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        let err = tokio_test::assert_err!(FolioClient::connect("not a url").await);
        assert!(matches!(err, SdkError::InvalidUrl(_)));
        tokio_test::assert_ok!(FolioClient::connect("http://127.0.0.1:8080").await);
    }

    #[tokio::test]
    async fn test_login_stores_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({ "email": "admin@example.com", "password": "pw-123456" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "Login successful",
                "data": {
                    "user": { "id": "u1", "email": "admin@example.com", "role": "super-admin" },
                    "accessToken": "access-1",
                    "refreshToken": "refresh-1"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(me_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result = client.login("admin@example.com", "pw-123456").await.unwrap();
        assert_eq!(result.user.role, "super-admin");
        assert_eq!(client.session().await, Some(session("access-1", "refresh-1")));

        let me = client.me().await.unwrap();
        assert_eq!(me.email, "admin@example.com");
    }

    #[tokio::test]
    async fn test_bad_credentials_are_an_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "success": false, "error": "Invalid credentials" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .login("admin@example.com", "nope")
            .await
            .unwrap_err();
        match err {
            SdkError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid credentials");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_expired_access_token_refreshes_once_and_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(unauthorized())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .and(body_json(json!({ "refreshToken": "refresh-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "accessToken": "fresh", "refreshToken": "refresh-2" }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(me_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)
            .await
            .with_session(session("stale", "refresh-1"));
        let me = client.me().await.unwrap();

        assert_eq!(me.id, "u1");
        assert_eq!(client.session().await, Some(session("fresh", "refresh-2")));
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(unauthorized())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "success": false, "error": "Invalid refresh token" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)
            .await
            .with_session(session("stale", "revoked"));
        let err = client.me().await.unwrap_err();

        assert!(matches!(err, SdkError::Unauthorized));
        assert!(client.session().await.is_none());
    }

    #[tokio::test]
    async fn test_transient_refresh_failure_keeps_session() {
        for status in [429u16, 500, 503] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/api/auth/me"))
                .respond_with(unauthorized())
                .expect(1)
                .mount(&server)
                .await;
            Mock::given(method("POST"))
                .and(path("/api/auth/refresh"))
                .respond_with(
                    ResponseTemplate::new(status)
                        .set_body_json(json!({ "success": false, "error": "Try again later" })),
                )
                .expect(1)
                .mount(&server)
                .await;

            let client = client_for(&server)
                .await
                .with_session(session("stale", "refresh-1"));
            let err = client.me().await.unwrap_err();

            assert_eq!(err.status(), Some(status), "{:?}", err);
            assert_eq!(
                client.session().await,
                Some(session("stale", "refresh-1")),
                "session dropped after {}",
                status
            );
        }
    }

    #[tokio::test]
    async fn test_explicit_refresh_keeps_session_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server)
            .await
            .with_session(session("a", "r"));
        let err = client.refresh().await.unwrap_err();

        assert!(matches!(err, SdkError::Api { status: 503, .. }));
        assert!(client.session().await.is_some());
    }

    #[tokio::test]
    async fn test_logout_everywhere_sends_flag_and_forgets_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .and(header("authorization", "Bearer a"))
            .and(body_json(json!({ "allSessions": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({ "success": true, "message": "Logged out successfully" }),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)
            .await
            .with_session(session("a", "r"));
        client.logout_everywhere().await.unwrap();
        assert!(client.session().await.is_none());
    }

    #[tokio::test]
    async fn test_second_401_is_not_retried_again() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/media"))
            .respond_with(unauthorized())
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "accessToken": "fresh", "refreshToken": "refresh-2" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)
            .await
            .with_session(session("stale", "refresh-1"));
        let err = client.list_media(&MediaQuery::default()).await.unwrap_err();
        assert!(matches!(err, SdkError::Unauthorized));
    }

    #[tokio::test]
    async fn test_anonymous_401_does_not_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/logs"))
            .respond_with(unauthorized())
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .logs(&LogQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Unauthorized));
    }

    #[tokio::test]
    async fn test_listing_carries_pagination_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/public/content/blogs"))
            .and(query_param("featured", "true"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{
                    "id": "c1", "contentType": "blogs", "title": "Hello", "slug": "hello",
                    "description": null, "fields": [], "status": "published",
                    "metadata": {}, "media": [], "createdAt": 1, "updatedAt": 2
                }],
                "pagination": { "page": 2, "limit": 10, "total": 11, "totalPages": 2 }
            })))
            .mount(&server)
            .await;

        let page = client_for(&server)
            .await
            .public_content(
                "blogs",
                &ContentQuery {
                    page: Some(2),
                    featured: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].slug, "hello");
        assert_eq!(page.pagination.total_pages, 2);
    }

    #[tokio::test]
    async fn test_api_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/content/blogs/missing"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "success": false, "error": "Content not found" })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server)
            .await
            .with_session(session("a", "r"));
        let err = client.get_content("blogs", "missing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("Content not found"));
    }

    #[tokio::test]
    async fn test_path_segments_are_encoded() {
        let client = FolioClient::connect("http://localhost:8080/cms/")
            .await
            .unwrap();
        let url = client.endpoint(&["api", "content", "blogs", "slug", "a b/c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/cms/api/content/blogs/slug/a%20b%2Fc"
        );
    }

    #[tokio::test]
    async fn test_logout_forgets_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .and(header("authorization", "Bearer a"))
            .and(body_json(json!({ "refreshToken": "r" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "message": "Logged out successfully"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await.with_session(session("a", "r"));
        client.logout().await.unwrap();
        assert!(client.session().await.is_none());
    }
}
