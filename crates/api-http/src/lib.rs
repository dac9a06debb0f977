//! HTTP API Layer
//!
//! axum routes for the admin API, the public read API and auth,
//! plus the activity-log middleware that records every mutating call.

pub mod activity;
pub mod error;
pub mod extract;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod session;
pub mod types;

pub use error::ApiError;
pub use rate_limiter::RateLimiter;
pub use server::{router, serve, AppState, ServerConfig};
pub use session::CookieSettings;
