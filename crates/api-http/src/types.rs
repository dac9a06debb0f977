//! HTTP Request/Response Types
//!
//! The JSON envelope shared by every endpoint and the query/body DTOs.

use folio_core::domain::{
    ActivityEvent, ContentFilter, ContentStatus, MediaFilter, PageRequest, Paginated, SortField,
    SortOrder, UserProfile,
};
use serde::{Deserialize, Serialize};

/// Default page size for content and media listings
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Response envelope: `{ success, data?, message?, error?, pagination? }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            pagination: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
            pagination: None,
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
            pagination: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn paginated(page: Paginated<T>) -> Self {
        let pagination = Pagination {
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages: page.total_pages,
        };
        Self {
            pagination: Some(pagination),
            ..Self::ok(page.items)
        }
    }
}

/// Marks a response for the activity middleware
#[derive(Debug, Clone)]
pub struct ActivityNote(pub ActivityEvent);

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
    /// Revoke every session of the caller, not just this one
    #[serde(default)]
    pub all_sessions: bool,
}

/// Public part of a user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl From<&UserProfile> for UserSummary {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id.clone(),
            email: profile.email.clone(),
            role: profile.role.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user: UserSummary,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct UserData<T> {
    pub user: T,
}

// ============================================================================
// Content
// ============================================================================

/// `GET /api/content/{type}` and `GET /api/public/content/{type}`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub status: Option<ContentStatus>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub category: Option<String>,
    pub featured: Option<bool>,
}

impl ContentListQuery {
    pub fn into_filter(self, content_type: &str) -> ContentFilter {
        let mut filter = ContentFilter::new(
            content_type,
            PageRequest::new(self.page, self.limit, DEFAULT_PAGE_SIZE),
        );
        filter.search = self.search.filter(|s| !s.trim().is_empty());
        filter.status = self.status;
        filter.category = self.category.filter(|c| !c.trim().is_empty());
        filter.featured = self.featured.unwrap_or(false);
        filter.sort_by = SortField::from_param(self.sort_by.as_deref());
        filter.sort_order = SortOrder::from_param(self.sort_order.as_deref());
        filter
    }
}

// ============================================================================
// Media
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub mime_type: Option<String>,
}

impl MediaListQuery {
    pub fn into_filter(self) -> MediaFilter {
        MediaFilter {
            search: self.search.filter(|s| !s.trim().is_empty()),
            mime_type: self.mime_type.filter(|m| !m.trim().is_empty()),
            page: PageRequest::new(self.page, self.limit, DEFAULT_PAGE_SIZE),
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SettingsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStatus {
    pub maintenance_mode: bool,
}
