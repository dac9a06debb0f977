//! Folio CMS - Main Entry Point
//! HTTP API server + maintenance scheduler

mod configuration;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use configuration::{AppConfig, LogFormat, LoggingSection, StorageBackend, StorageSection};
use folio_api_http::{router, serve, AppState, CookieSettings, RateLimiter, ServerConfig};
use folio_core::application::{
    shutdown_channel, ActivityService, AuthService, AuthSettings, ContentService,
    MaintenanceScheduler, MediaService, SettingsService, StatisticsService,
};
use folio_core::port::id_provider::UuidProvider;
use folio_core::port::time_provider::SystemTimeProvider;
use folio_core::port::MediaStorage;
use folio_infra_auth::{Argon2PasswordHasher, JwtTokenService};
use folio_infra_sqlite::{
    create_pool_with_size, run_migrations, SqliteActivityLogRepository, SqliteContentRepository,
    SqliteMaintenance, SqliteMediaRepository, SqliteSessionRepository, SqliteSettingsRepository,
    SqliteUserRepository,
};
use folio_infra_storage::{GcsConfig, GcsMediaStore, ImageSizeInspector, LocalMediaStore};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const LOG_FORMAT_ENV: &str = "FOLIO_LOG_FORMAT";
const DEFAULT_LOG_FILTER: &str = "folio=info,tower_http=info";
const LOCAL_UPLOADS_PATH: &str = "/uploads";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration (defaults -> folio.toml -> FOLIO_* env)
    let config = AppConfig::load()?;

    // 2. Initialize logging
    let _log_guard = init_logging(&config.logging)?;
    info!("Folio CMS v{} starting...", VERSION);

    // 3. Initialize database
    info!(url = %config.database.url, "Initializing database...");
    let pool = create_pool_with_size(&config.database.url, config.database.max_connections)
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);

    let tokens = Arc::new(
        JwtTokenService::new(&config.auth.jwt(), time_provider.clone())
            .context("Invalid JWT configuration")?,
    );
    let content_repo = Arc::new(SqliteContentRepository::new(pool.clone()));
    let media_repo = Arc::new(SqliteMediaRepository::new(pool.clone()));
    let storage = media_storage(&config.storage).await?;

    let auth = Arc::new(AuthService::new(
        Arc::new(SqliteUserRepository::new(pool.clone())),
        Arc::new(SqliteSessionRepository::new(pool.clone())),
        tokens,
        Arc::new(Argon2PasswordHasher::new()),
        id_provider.clone(),
        time_provider.clone(),
        AuthSettings {
            open_registration: config.auth.open_registration,
        },
    ));

    let state = AppState {
        auth: auth.clone(),
        content: Arc::new(ContentService::new(
            content_repo.clone(),
            media_repo.clone(),
            id_provider.clone(),
            time_provider.clone(),
        )),
        media: Arc::new(MediaService::new(
            media_repo,
            storage,
            Arc::new(ImageSizeInspector),
            id_provider.clone(),
            time_provider.clone(),
            config.storage.max_upload_bytes,
        )),
        settings: Arc::new(SettingsService::new(
            Arc::new(SqliteSettingsRepository::new(pool.clone())),
            id_provider.clone(),
            time_provider.clone(),
        )),
        statistics: Arc::new(StatisticsService::new(content_repo, time_provider.clone())),
        activity: Arc::new(ActivityService::new(
            Arc::new(SqliteActivityLogRepository::new(pool.clone())),
            id_provider.clone(),
            time_provider.clone(),
        )),
        limiter: Arc::new(RateLimiter::new(
            config.auth.rate_limit_burst,
            config.auth.rate_limit_per_sec,
        )),
        cookies: CookieSettings {
            secure: config.auth.secure_cookies,
            access_max_age_secs: config.auth.access_ttl_secs,
            refresh_max_age_secs: config.auth.refresh_ttl_secs,
        },
        trust_proxy_headers: config.server.trust_proxy_headers,
    };

    // 5. Bootstrap the first super-admin
    if let (Some(email), Some(password)) = (
        config.bootstrap.admin_email.as_deref(),
        config.bootstrap.admin_password.as_deref(),
    ) {
        match auth.ensure_bootstrap_admin(email, password).await {
            Ok(Some(profile)) => info!(email = %profile.email, "Created bootstrap super-admin"),
            Ok(None) => tracing::debug!("Users exist, skipping bootstrap admin"),
            Err(e) => return Err(e).context("Bootstrap admin creation failed"),
        }
    }

    // 6. Start Maintenance Scheduler
    let (shutdown_tx, shutdown_token) = shutdown_channel();

    info!("Starting maintenance scheduler...");
    let maintenance = Arc::new(SqliteMaintenance::new(pool.clone(), time_provider.clone()));
    let maintenance_scheduler = MaintenanceScheduler::new(
        maintenance,
        config.maintenance.policy(),
        config.maintenance.interval_hours,
    );
    let maintenance_handle = tokio::spawn(maintenance_scheduler.run(shutdown_token.clone()));

    // 7. Start HTTP server
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        cors_origins: config.server.cors_origins.clone(),
        uploads_dir: (config.storage.backend == StorageBackend::Local)
            .then(|| config.storage.local_root.clone()),
    };
    let listener = TcpListener::bind(server_config.addr())
        .await
        .with_context(|| format!("Failed to bind {}", server_config.addr()))?;
    let app = router(state, &server_config);

    let mut http_shutdown = shutdown_token.clone();
    let mut server_handle = tokio::spawn(serve(listener, app, async move {
        http_shutdown.wait().await;
    }));

    info!(addr = %server_config.addr(), "System ready");
    info!("Press Ctrl+C to shutdown");

    // 8. Wait for shutdown signal (or an early server failure)
    tokio::select! {
        _ = shutdown_signal() => {
            info!("Shutdown signal received. Exiting gracefully...");
        }
        result = &mut server_handle => {
            shutdown_tx.shutdown();
            result.context("HTTP server task panicked")?.context("HTTP server failed")?;
            return Ok(());
        }
    }

    // 9. Graceful shutdown
    shutdown_tx.shutdown();
    match tokio::time::timeout(Duration::from_secs(10), server_handle).await {
        Ok(joined) => joined
            .context("HTTP server task panicked")?
            .context("HTTP server failed")?,
        Err(_) => tracing::warn!("HTTP server did not drain within 10s"),
    }
    let _ = tokio::time::timeout(Duration::from_secs(5), maintenance_handle).await;

    pool.close().await;
    telemetry::shutdown();
    info!("Shutdown complete.");

    Ok(())
}

/// Install the tracing subscriber
///
/// The returned guard must live until exit so buffered file output is flushed.
fn init_logging(logging: &LoggingSection) -> Result<Option<WorkerGuard>> {
    let format = std::env::var(LOG_FORMAT_ENV)
        .ok()
        .and_then(|v| LogFormat::parse(&v))
        .unwrap_or(logging.format);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Failed to create env filter")?;

    let mut layers: Vec<telemetry::BoxedLayer> = Vec::new();
    match format {
        // Production: JSON structured logging
        LogFormat::Json => layers.push(fmt::layer().json().boxed()),
        // Development: Pretty formatting with colors
        LogFormat::Pretty => layers.push(fmt::layer().pretty().boxed()),
    }

    let mut guard = None;
    if let Some(directory) = &logging.directory {
        let appender = tracing_appender::rolling::daily(directory, "folio.log");
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        );
        guard = Some(file_guard);
    }

    if let Some(otel) = telemetry::layer()? {
        layers.push(otel);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

async fn media_storage(storage: &StorageSection) -> Result<Arc<dyn MediaStorage>> {
    match storage.backend {
        StorageBackend::Local => {
            tokio::fs::create_dir_all(&storage.local_root)
                .await
                .with_context(|| {
                    format!("Failed to create {}", storage.local_root.display())
                })?;
            let base = storage
                .public_base_url
                .clone()
                .unwrap_or_else(|| LOCAL_UPLOADS_PATH.to_string());
            info!(root = %storage.local_root.display(), "Using local media storage");
            Ok(Arc::new(LocalMediaStore::new(&storage.local_root, base)))
        }
        StorageBackend::Gcs => {
            let mut gcs = GcsConfig::new(storage.bucket.clone().unwrap_or_default());
            gcs.access_token = storage.access_token.clone();
            gcs.public_base_url = storage.public_base_url.clone();
            info!(bucket = %gcs.bucket, "Using Google Cloud Storage");
            Ok(Arc::new(GcsMediaStore::new(gcs).context("GCS setup failed")?))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
