// Activity Log Domain Model

use crate::domain::content::Content;
use crate::domain::media::Media;
use crate::domain::pagination::PageRequest;
use crate::domain::user::{UserId, UserRef};
use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    CreateContent,
    UpdateContent,
    DeleteContent,
    ReadContent,
    UploadMedia,
    DeleteMedia,
    UpdateSettings,
    LoginSuccess,
    LoginFailed,
    Logout,
    RegisterUser,
    Error,
    AccessDenied,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::CreateContent => "CREATE_CONTENT",
            ActivityAction::UpdateContent => "UPDATE_CONTENT",
            ActivityAction::DeleteContent => "DELETE_CONTENT",
            ActivityAction::ReadContent => "READ_CONTENT",
            ActivityAction::UploadMedia => "UPLOAD_MEDIA",
            ActivityAction::DeleteMedia => "DELETE_MEDIA",
            ActivityAction::UpdateSettings => "UPDATE_SETTINGS",
            ActivityAction::LoginSuccess => "LOGIN_SUCCESS",
            ActivityAction::LoginFailed => "LOGIN_FAILED",
            ActivityAction::Logout => "LOGOUT",
            ActivityAction::RegisterUser => "REGISTER_USER",
            ActivityAction::Error => "ERROR",
            ActivityAction::AccessDenied => "ACCESS_DENIED",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let action = match s {
            "CREATE_CONTENT" => ActivityAction::CreateContent,
            "UPDATE_CONTENT" => ActivityAction::UpdateContent,
            "DELETE_CONTENT" => ActivityAction::DeleteContent,
            "READ_CONTENT" => ActivityAction::ReadContent,
            "UPLOAD_MEDIA" => ActivityAction::UploadMedia,
            "DELETE_MEDIA" => ActivityAction::DeleteMedia,
            "UPDATE_SETTINGS" => ActivityAction::UpdateSettings,
            "LOGIN_SUCCESS" => ActivityAction::LoginSuccess,
            "LOGIN_FAILED" => ActivityAction::LoginFailed,
            "LOGOUT" => ActivityAction::Logout,
            "REGISTER_USER" => ActivityAction::RegisterUser,
            "ERROR" => ActivityAction::Error,
            "ACCESS_DENIED" => ActivityAction::AccessDenied,
            other => return Err(DomainError::InvalidAction(other.to_string())),
        };
        Ok(action)
    }
}

/// Resource family an action touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityResource {
    Content,
    Media,
    Settings,
    Auth,
    User,
    System,
}

impl ActivityResource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityResource::Content => "content",
            ActivityResource::Media => "media",
            ActivityResource::Settings => "settings",
            ActivityResource::Auth => "auth",
            ActivityResource::User => "user",
            ActivityResource::System => "system",
        }
    }

    /// Infer the resource family from a request path
    pub fn from_path(path: &str) -> Self {
        let rest = path.strip_prefix("/api").unwrap_or(path);
        let rest = rest.strip_prefix("/public").unwrap_or(rest);
        let segment = rest.trim_start_matches('/').split('/').next().unwrap_or("");
        match segment {
            "content" | "content-types" => ActivityResource::Content,
            "media" => ActivityResource::Media,
            "settings" => ActivityResource::Settings,
            "auth" => ActivityResource::Auth,
            "users" => ActivityResource::User,
            _ => ActivityResource::System,
        }
    }
}

impl fmt::Display for ActivityResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityResource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content" => Ok(ActivityResource::Content),
            "media" => Ok(ActivityResource::Media),
            "settings" => Ok(ActivityResource::Settings),
            "auth" => Ok(ActivityResource::Auth),
            "user" => Ok(ActivityResource::User),
            "system" => Ok(ActivityResource::System),
            other => Err(DomainError::InvalidResource(other.to_string())),
        }
    }
}

/// Request methods that are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// `None` for methods that are never logged (HEAD, OPTIONS, ...)
    pub fn parse(method: &str) -> Option<Self> {
        match method {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub fn is_state_changing(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened: attached by handlers to their responses
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEvent {
    pub action: ActivityAction,
    pub resource: ActivityResource,
    pub resource_id: Option<String>,
    pub user_id: Option<UserId>,
    pub email: Option<String>,
    pub details: Option<Value>,
}

impl ActivityEvent {
    pub fn new(action: ActivityAction, resource: ActivityResource) -> Self {
        Self {
            action,
            resource,
            resource_id: None,
            user_id: None,
            email: None,
            details: None,
        }
    }

    pub fn actor(mut self, user_id: Option<&str>, email: Option<&str>) -> Self {
        self.user_id = user_id.map(str::to_string);
        self.email = email.map(str::to_string);
        self
    }

    pub fn resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Login, logout and registration events
    pub fn auth(action: ActivityAction, email: &str) -> Self {
        Self::new(action, ActivityResource::Auth).actor(None, Some(email))
    }

    pub fn content_change(action: ActivityAction, content: &Content) -> Self {
        Self::new(action, ActivityResource::Content)
            .resource_id(content.id.clone())
            .details(json!({
                "contentType": content.content_type,
                "title": content.title,
                "slug": content.slug,
            }))
    }

    pub fn media_change(action: ActivityAction, media: &Media) -> Self {
        Self::new(action, ActivityResource::Media)
            .resource_id(media.id.clone())
            .details(json!({
                "filename": media.original_name,
                "storageKey": media.storage_key,
                "size": media.size,
                "mimeType": media.mime_type,
            }))
    }

    pub fn settings_change(key: &str, category: Option<&str>) -> Self {
        Self::new(ActivityAction::UpdateSettings, ActivityResource::Settings)
            .resource_id(key)
            .details(json!({ "key": key, "category": category }))
    }

    pub fn error(resource: ActivityResource, message: &str) -> Self {
        Self::new(ActivityAction::Error, resource).details(json!({ "error": message }))
    }
}

/// Where it happened: captured by the HTTP layer
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub method: HttpMethod,
    pub path: String,
    pub status_code: u16,
    pub ip_address: String,
    pub user_agent: String,
    pub duration_ms: Option<i64>,
}

/// A persisted audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    pub user_id: Option<UserId>,
    pub email: Option<String>,
    pub action: ActivityAction,
    pub resource: ActivityResource,
    pub resource_id: Option<String>,
    pub method: HttpMethod,
    pub path: String,
    pub status_code: u16,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub details: Option<Value>,
    pub duration_ms: Option<i64>,
    pub timestamp: i64,
}

impl ActivityLog {
    pub fn from_event(id: String, timestamp: i64, event: ActivityEvent, ctx: RequestContext) -> Self {
        Self {
            id,
            user_id: event.user_id,
            email: event.email,
            action: event.action,
            resource: event.resource,
            resource_id: event.resource_id,
            method: ctx.method,
            path: ctx.path,
            status_code: ctx.status_code,
            ip_address: Some(ctx.ip_address),
            user_agent: Some(ctx.user_agent),
            details: event.details,
            duration_ms: ctx.duration_ms,
            timestamp,
        }
    }
}

/// Activity record with the acting user resolved
#[derive(Debug, Clone, Serialize)]
pub struct ActivityLogView {
    #[serde(flatten)]
    pub log: ActivityLog,
    pub user: Option<UserRef>,
}

/// Query criteria for the audit log
#[derive(Debug, Clone)]
pub struct ActivityFilter {
    /// Case-insensitive substring over email, path and resource
    pub search: Option<String>,
    pub action: Option<ActivityAction>,
    pub resource: Option<ActivityResource>,
    pub user_id: Option<UserId>,
    /// Inclusive lower bound (epoch ms)
    pub start: Option<i64>,
    /// Inclusive upper bound (epoch ms)
    pub end: Option<i64>,
    pub page: PageRequest,
}
