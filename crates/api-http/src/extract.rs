// Request Extractors - caller identity and envelope-aware rejections

use crate::activity;
use crate::error::ApiError;
use crate::server::AppState;
use crate::session;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use folio_core::domain::AuthenticatedUser;
use std::convert::Infallible;

/// Authenticated caller; rejects with 401 otherwise
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = session::access_token(&parts.headers).ok_or_else(ApiError::unauthorized)?;
        let user = state.auth.authenticate(&token)?;
        Ok(CurrentUser(user))
    }
}

/// Caller identity when a valid token is present
#[derive(Debug, Clone, Default)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Infallible> {
        let user = session::access_token(&parts.headers)
            .and_then(|token| state.auth.authenticate(&token).ok());
        Ok(OptionalUser(user))
    }
}

/// Caller address used for throttling
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Infallible> {
        Ok(ClientIp(activity::client_ip(
            &parts.extensions,
            &parts.headers,
            state.trust_proxy_headers,
        )))
    }
}

/// `Json` whose rejection uses the API envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejection uses the API envelope
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// `Path` whose rejection uses the API envelope
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
