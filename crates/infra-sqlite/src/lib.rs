// Folio Infrastructure - SQLite Adapter
// Implements: User/Session/Content/Media/Settings/ActivityLog repositories, Maintenance

mod activity_repository;
mod connection;
mod content_repository;
mod error;
mod maintenance_impl;
mod media_repository;
mod migration;
mod session_repository;
mod settings_repository;
mod sql;
mod user_repository;

pub use activity_repository::SqliteActivityLogRepository;
pub use connection::{create_pool, create_pool_with_size, DEFAULT_MAX_CONNECTIONS};
pub use content_repository::SqliteContentRepository;
pub use maintenance_impl::SqliteMaintenance;
pub use media_repository::SqliteMediaRepository;
pub use migration::run_migrations;
pub use session_repository::SqliteSessionRepository;
pub use settings_repository::SqliteSettingsRepository;
pub use sqlx::SqlitePool;
pub use user_repository::SqliteUserRepository;

// Note: sqlx::Error conversion is handled by `error::map_sqlx_error`
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
