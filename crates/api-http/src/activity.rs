//! Activity Middleware
//!
//! Records audit entries for annotated responses, server errors and
//! denied mutations. Handlers annotate via the `ActivityNote` extension.

use crate::error::ErrorDetail;
use crate::server::AppState;
use crate::types::ActivityNote;
use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{Extensions, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use folio_core::domain::{
    ActivityAction, ActivityEvent, ActivityResource, HttpMethod, RequestContext,
};
use std::net::SocketAddr;
use std::time::Instant;

const UNKNOWN: &str = "unknown";

/// Client IP: the peer address of the connection
///
/// `X-Forwarded-For` (first hop) and `X-Real-IP` are only consulted when the
/// server sits behind a proxy that overwrites them (`trust_proxy_headers`).
pub fn client_ip(
    extensions: &Extensions,
    headers: &HeaderMap,
    trust_proxy_headers: bool,
) -> String {
    if trust_proxy_headers {
        if let Some(ip) = forwarded_ip(headers) {
            return ip.to_string();
        }
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<&str> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    header("x-forwarded-for").or_else(|| header("x-real-ip"))
}

pub fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

pub async fn record_activity(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(method) = HttpMethod::parse(request.method().as_str()) else {
        return next.run(request).await;
    };

    let started = Instant::now();
    let path = request.uri().path().to_string();
    let ip_address = client_ip(
        request.extensions(),
        request.headers(),
        state.trust_proxy_headers,
    );
    let user_agent = user_agent(request.headers());

    let mut response = next.run(request).await;
    let status = response.status();

    let note = response.extensions_mut().remove::<ActivityNote>();
    let detail = response.extensions_mut().remove::<ErrorDetail>();
    let Some(event) = classify(note, detail, method, &path, status) else {
        return response;
    };

    let ctx = RequestContext {
        method,
        path,
        status_code: status.as_u16(),
        ip_address,
        user_agent,
        duration_ms: Some(started.elapsed().as_millis() as i64),
    };
    state.activity.record(event, ctx).await;

    response
}

/// Pick the audit event for a finished request, if any
fn classify(
    note: Option<ActivityNote>,
    detail: Option<ErrorDetail>,
    method: HttpMethod,
    path: &str,
    status: StatusCode,
) -> Option<ActivityEvent> {
    if let Some(ActivityNote(event)) = note {
        return Some(event);
    }

    if status.is_server_error() {
        let message = detail
            .map(|d| d.0)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Server error").to_string());
        return Some(ActivityEvent::error(ActivityResource::System, &message));
    }

    let denied = status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN;
    if denied && method.is_state_changing() {
        return Some(ActivityEvent::new(
            ActivityAction::AccessDenied,
            ActivityResource::from_path(path),
        ));
    }

    None
}
