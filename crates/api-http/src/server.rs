//! HTTP Server
//!
//! Router assembly and the serve loop with graceful shutdown.

use crate::activity::record_activity;
use crate::handler::{auth, content, content_types, logs, media, public, settings};
use crate::rate_limiter::RateLimiter;
use crate::session::CookieSettings;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use folio_core::application::{
    ActivityService, AuthService, ContentService, MediaService, SettingsService,
    StatisticsService,
};
use serde_json::{json, Value};
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 8080;

/// Room for multipart framing on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// HTTP Server Configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed to call the API with credentials
    pub cors_origins: Vec<String>,
    /// Local media directory served under `/uploads`
    pub uploads_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
            cors_origins: Vec::new(),
            uploads_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub content: Arc<ContentService>,
    pub media: Arc<MediaService>,
    pub settings: Arc<SettingsService>,
    pub statistics: Arc<StatisticsService>,
    pub activity: Arc<ActivityService>,
    /// Applied to login, register and refresh
    pub limiter: Arc<RateLimiter>,
    pub cookies: CookieSettings,
    /// Take the client IP from `X-Forwarded-For`/`X-Real-IP` (reverse proxy only)
    pub trust_proxy_headers: bool,
}

/// Build the full application router
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let upload_limit = state.media.max_upload_bytes() as usize + MULTIPART_OVERHEAD_BYTES;

    let api = Router::new()
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        // Content
        .route(
            "/api/content/{type}",
            get(content::list).post(content::create),
        )
        .route(
            "/api/content/{type}/{id}",
            get(content::get).put(content::update).delete(content::delete),
        )
        .route("/api/content/{type}/slug/{slug}", get(content::get_by_slug))
        .route("/api/content-types", get(content_types::list))
        .route("/api/content-types/{name}", get(content_types::get))
        // Media
        .route("/api/media", get(media::list))
        .route(
            "/api/media/upload",
            post(media::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/media/{id}", get(media::get).delete(media::delete))
        // Settings & logs
        .route("/api/settings", get(settings::list).post(settings::save))
        .route("/api/logs", get(logs::list))
        // Public
        .route("/api/public/content/homepage", get(public::homepage))
        .route("/api/public/content/{type}", get(public::content_list))
        .route("/api/public/content/{type}/{slug}", get(public::content_get))
        .route("/api/public/settings", get(public::settings))
        .route("/api/public/stats", get(public::stats))
        .route("/api/public/status", get(public::status))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            record_activity,
        ));

    let mut app = Router::new()
        .route("/health", get(health))
        .merge(api);

    if let Some(dir) = &config.uploads_dir {
        app = app.nest_service("/uploads", ServeDir::new(dir));
    }

    let app = app.layer(TraceLayer::new_for_http());
    let app = match cors_layer(&config.cors_origins) {
        Some(cors) => app.layer(cors),
        None => app,
    };

    app.with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(addr = ?listener.local_addr().ok(), "Starting HTTP server");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": folio_core::VERSION }))
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
            .allow_credentials(true),
    )
}
