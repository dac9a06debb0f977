// Domain Layer - Pure business logic and entities

pub mod activity;
pub mod content;
pub mod content_type;
pub mod error;
pub mod media;
pub mod pagination;
pub mod setting;
pub mod slug;
pub mod user;

// Re-exports
pub use activity::{
    ActivityAction, ActivityEvent, ActivityFilter, ActivityLog, ActivityLogView,
    ActivityResource, HttpMethod, RequestContext,
};
pub use content::{
    Content, ContentField, ContentFilter, ContentId, ContentMetadata, ContentStatus,
    ContentView, FieldKind, SortField,
};
pub use content_type::{ContentTypeDefinition, FieldDefinition, FieldType};
pub use error::DomainError;
pub use media::{Media, MediaFilter, MediaId, MediaView};
pub use pagination::{PageRequest, Paginated, SortOrder};
pub use setting::{Setting, SettingsMap, PUBLIC_SETTINGS_KEYS};
pub use slug::slugify;
pub use user::{AuthenticatedUser, RefreshSession, Role, User, UserId, UserProfile, UserRef};
