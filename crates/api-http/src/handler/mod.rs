//! Route Handlers
//!
//! One module per resource. Handlers stay thin: extract, call the service,
//! wrap the result in the envelope and annotate it for the audit log.

pub mod auth;
pub mod content;
pub mod content_types;
pub mod logs;
pub mod media;
pub mod public;
pub mod settings;

use crate::error::{ApiError, ApiResult};
use crate::extract::ClientIp;
use crate::server::AppState;
use crate::types::ActivityNote;
use axum::Extension;
use folio_core::domain::{ActivityEvent, AuthenticatedUser};

/// Attach an audit event to a response
pub(crate) fn note(event: ActivityEvent) -> Extension<ActivityNote> {
    Extension(ActivityNote(event))
}

/// Attribute an audit event to the caller
pub(crate) fn by(event: ActivityEvent, user: &AuthenticatedUser) -> ActivityEvent {
    event.actor(Some(&user.user_id), Some(&user.email))
}

/// Spend one token of the caller's credential-endpoint budget
pub(crate) fn throttle(state: &AppState, client: &ClientIp) -> ApiResult<()> {
    if state.limiter.check(&client.0) {
        Ok(())
    } else {
        Err(ApiError::Throttled)
    }
}
