// Application Layer - Use Cases and Business Logic

pub mod activity;
pub mod auth;
pub mod cache;
pub mod content;
pub mod maintenance;
pub mod media;
pub mod settings;
pub mod shutdown;
pub mod statistics;

// Re-exports
pub use activity::{ActivityQuery, ActivityService};
pub use auth::{
    AuthService, AuthSettings, LoginOutcome, LoginRejection, RegisterRequest, Session,
};
pub use cache::TtlCache;
pub use content::{ContentInput, ContentPatch, ContentService, ContentUpdate};
pub use maintenance::MaintenanceScheduler;
pub use media::{MediaService, UploadInput};
pub use settings::{SettingInput, SettingsService};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use statistics::{SiteStatistics, StatisticsService};
