// Port Layer - Interfaces for external dependencies

pub mod activity_repository;
pub mod content_repository;
pub mod id_provider; // For deterministic testing
pub mod maintenance;
pub mod media_repository;
pub mod media_storage;
pub mod password_hasher;
pub mod session_repository;
pub mod settings_repository;
pub mod time_provider;
pub mod token_service;
pub mod user_repository;

// Re-exports
pub use activity_repository::ActivityLogRepository;
pub use content_repository::ContentRepository;
pub use id_provider::IdProvider;
pub use maintenance::{Maintenance, MaintenanceConfig, MaintenanceStats};
pub use media_repository::MediaRepository;
pub use media_storage::{MediaInspector, MediaStorage};
pub use password_hasher::PasswordHasher;
pub use session_repository::SessionRepository;
pub use settings_repository::SettingsRepository;
pub use time_provider::TimeProvider;
pub use token_service::{IssuedToken, TokenClaims, TokenKind, TokenService, TokenSubject};
pub use user_repository::UserRepository;
