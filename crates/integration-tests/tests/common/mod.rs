//! Shared harness: a real server on an ephemeral port

#![allow(dead_code)]

use folio_api_http::{router, serve, AppState, CookieSettings, RateLimiter, ServerConfig};
use folio_core::application::{
    ActivityService, AuthService, AuthSettings, ContentService, MediaService, SettingsService,
    StatisticsService,
};
use folio_core::port::id_provider::UuidProvider;
use folio_core::port::time_provider::SystemTimeProvider;
use folio_infra_auth::{Argon2PasswordHasher, JwtConfig, JwtTokenService};
use folio_infra_sqlite::{
    create_pool, run_migrations, SqliteActivityLogRepository, SqliteContentRepository,
    SqliteMediaRepository, SqliteSessionRepository, SqliteSettingsRepository,
    SqliteUserRepository,
};
use folio_infra_storage::{ImageSizeInspector, LocalMediaStore};
use folio_sdk::{FolioClient, RegisterRequest};
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

/// 1x1 transparent GIF
pub const PIXEL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
];

pub struct TestServer {
    pub addr: SocketAddr,
    pub pool: SqlitePool,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<std::io::Result<()>>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn client(&self) -> FolioClient {
        FolioClient::connect(self.url()).await.unwrap()
    }

    /// Stop accepting and wait for in-flight requests
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.unwrap().unwrap();
        }
    }
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: "integration-access-secret-0123456789".to_string(),
        refresh_secret: "integration-refresh-secret-0123456789".to_string(),
        access_ttl_secs: JwtConfig::DEFAULT_ACCESS_TTL_SECS,
        refresh_ttl_secs: JwtConfig::DEFAULT_REFRESH_TTL_SECS,
    }
}

/// Fresh in-memory database
pub async fn memory_pool() -> SqlitePool {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

/// Wire the full stack over `pool` and start serving on 127.0.0.1:0
pub async fn start_server(pool: SqlitePool, uploads: &Path) -> TestServer {
    let time = Arc::new(SystemTimeProvider);
    let ids = Arc::new(UuidProvider);
    let tokens = Arc::new(JwtTokenService::new(&jwt_config(), time.clone()).unwrap());

    let content_repo = Arc::new(SqliteContentRepository::new(pool.clone()));
    let media_repo = Arc::new(SqliteMediaRepository::new(pool.clone()));

    let state = AppState {
        auth: Arc::new(AuthService::new(
            Arc::new(SqliteUserRepository::new(pool.clone())),
            Arc::new(SqliteSessionRepository::new(pool.clone())),
            tokens,
            Arc::new(Argon2PasswordHasher::new()),
            ids.clone(),
            time.clone(),
            AuthSettings::default(),
        )),
        content: Arc::new(ContentService::new(
            content_repo.clone(),
            media_repo.clone(),
            ids.clone(),
            time.clone(),
        )),
        media: Arc::new(MediaService::new(
            media_repo,
            Arc::new(LocalMediaStore::new(uploads, "/uploads")),
            Arc::new(ImageSizeInspector),
            ids.clone(),
            time.clone(),
            1024 * 1024,
        )),
        settings: Arc::new(SettingsService::new(
            Arc::new(SqliteSettingsRepository::new(pool.clone())),
            ids.clone(),
            time.clone(),
        )),
        statistics: Arc::new(StatisticsService::new(content_repo, time.clone())),
        activity: Arc::new(ActivityService::new(
            Arc::new(SqliteActivityLogRepository::new(pool.clone())),
            ids,
            time,
        )),
        limiter: Arc::new(RateLimiter::new(1000, 1000)),
        cookies: CookieSettings::default(),
        trust_proxy_headers: false,
    };

    let config = ServerConfig {
        uploads_dir: Some(uploads.to_path_buf()),
        ..Default::default()
    };
    let app = router(state, &config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(serve(listener, app, async move {
        let _ = rx.await;
    }));

    TestServer {
        addr,
        pool,
        shutdown: Some(tx),
        handle: Some(handle),
    }
}

/// In-memory server plus the temp dir backing its uploads
pub async fn spawn() -> (TestServer, TempDir) {
    let uploads = TempDir::new().unwrap();
    let server = start_server(memory_pool().await, uploads.path()).await;
    (server, uploads)
}

/// Register the first user (super-admin) and log in
pub async fn admin_client(server: &TestServer) -> FolioClient {
    let client = server.client().await;
    client
        .register(&RegisterRequest {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            role: None,
        })
        .await
        .unwrap();
    client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    client
}
