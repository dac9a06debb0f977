// Auth Handlers - register, login, token refresh, logout, profile

use super::{by, note, throttle};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ClientIp, CurrentUser, OptionalUser};
use crate::server::AppState;
use crate::session;
use crate::types::{
    ApiResponse, LoginData, LoginRequest, LogoutRequest, RefreshRequest, TokenPair, UserData,
    UserSummary,
};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use folio_core::application::{LoginOutcome, RegisterRequest};
use folio_core::domain::{ActivityAction, ActivityEvent};
use serde::de::DeserializeOwned;
use serde_json::json;

pub async fn register(
    State(state): State<AppState>,
    OptionalUser(caller): OptionalUser,
    client: ClientIp,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<Response> {
    throttle(&state, &client)?;

    let profile = state.auth.register(request, caller.as_ref()).await?;

    let event = ActivityEvent::auth(ActivityAction::RegisterUser, &profile.email)
        .resource_id(profile.id.clone())
        .details(json!({ "role": profile.role.as_str() }));
    let event = match &caller {
        Some(admin) => by(event, admin),
        None => event.actor(Some(&profile.id), Some(&profile.email)),
    };

    let body = ApiResponse::ok(UserData {
        user: UserSummary::from(&profile),
    })
    .with_message("User registered successfully");

    Ok((StatusCode::CREATED, note(event), Json(body)).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    client: ClientIp,
    jar: CookieJar,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Response> {
    throttle(&state, &client)?;

    match state.auth.login(&request.email, &request.password).await? {
        LoginOutcome::Success(session) => {
            let event = ActivityEvent::auth(ActivityAction::LoginSuccess, &session.user.email)
                .actor(Some(&session.user.id), Some(&session.user.email));
            let jar = session::issue(
                jar,
                &state.cookies,
                &session.access_token,
                &session.refresh_token,
            );
            let body = ApiResponse::ok(LoginData {
                user: UserSummary::from(&session.user),
                access_token: session.access_token,
                refresh_token: session.refresh_token,
            })
            .with_message("Login successful");

            Ok((jar, note(event), Json(body)).into_response())
        }
        LoginOutcome::Rejected(rejection) => {
            tracing::info!(reason = rejection.reason(), "Login rejected");
            let event = ActivityEvent::auth(ActivityAction::LoginFailed, request.email.trim())
                .details(json!({ "reason": rejection.reason() }));
            let body = ApiResponse::<()>::failure("Invalid credentials");

            Ok((StatusCode::UNAUTHORIZED, note(event), Json(body)).into_response())
        }
    }
}

/// Rotate the refresh token (cookie first, then JSON body)
pub async fn refresh(
    State(state): State<AppState>,
    client: ClientIp,
    jar: CookieJar,
    body: Bytes,
) -> ApiResult<Response> {
    throttle(&state, &client)?;

    let token = session::refresh_token(&jar).or_else(|| refresh_token_from_body(&body));
    let session = state.auth.refresh(token.as_deref()).await?;

    let jar = session::issue(
        jar,
        &state.cookies,
        &session.access_token,
        &session.refresh_token,
    );
    let body = ApiResponse::ok(TokenPair {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
    })
    .with_message("Token refreshed successfully");

    Ok((jar, Json(body)).into_response())
}

pub async fn logout(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    jar: CookieJar,
    body: Bytes,
) -> ApiResult<Response> {
    let request: LogoutRequest = parse_body(&body).unwrap_or_default();
    let token = session::refresh_token(&jar)
        .or(request.refresh_token)
        .filter(|t| !t.is_empty());

    let event = match &user {
        Some(user) if request.all_sessions => {
            let revoked = state.auth.logout_everywhere(user).await?;
            Some(note(by(
                ActivityEvent::auth(ActivityAction::Logout, &user.email)
                    .details(json!({ "allSessions": true, "sessionsRevoked": revoked })),
                user,
            )))
        }
        Some(user) if token.is_some() => {
            let revoked = state.auth.logout(token.as_deref(), Some(user)).await?;
            Some(note(by(
                ActivityEvent::auth(ActivityAction::Logout, &user.email)
                    .details(json!({ "sessionRevoked": revoked })),
                user,
            )))
        }
        _ => None,
    };

    let jar = session::clear(jar, &state.cookies);
    Ok((jar, event, Json(ApiResponse::message("Logged out successfully"))).into_response())
}

pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Response> {
    let profile = state.auth.me(&user.user_id).await?;
    Ok(Json(ApiResponse::ok(UserData { user: profile })).into_response())
}

fn refresh_token_from_body(body: &[u8]) -> Option<String> {
    parse_body::<RefreshRequest>(body)
        .and_then(|r| r.refresh_token)
        .filter(|t| !t.is_empty())
}

/// Optional JSON body; absent or malformed bodies are ignored
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Option<T> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice(body).ok()
}
