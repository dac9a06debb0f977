// Session Cookies - access/refresh token transport for browser clients

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::{Duration, OffsetDateTime};

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Cookie attributes for issued sessions
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    /// Send the `Secure` attribute (enable behind HTTPS)
    pub secure: bool,
    pub access_max_age_secs: i64,
    pub refresh_max_age_secs: i64,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: false,
            access_max_age_secs: 15 * 60,
            refresh_max_age_secs: 7 * 24 * 60 * 60,
        }
    }
}

/// Access token for the request
///
/// An `Authorization` header wins even when malformed; the cookie is only
/// consulted when no header was sent.
pub fn access_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        return value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
    }

    CookieJar::from_headers(headers)
        .get(ACCESS_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

pub fn refresh_token(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Store a freshly issued token pair
pub fn issue(
    jar: CookieJar,
    settings: &CookieSettings,
    access_token: &str,
    refresh_token: &str,
) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_COOKIE,
        access_token.to_string(),
        settings.access_max_age_secs,
        settings.secure,
    ))
    .add(session_cookie(
        REFRESH_COOKIE,
        refresh_token.to_string(),
        settings.refresh_max_age_secs,
        settings.secure,
    ))
}

/// Expire both session cookies
///
/// Always sets explicit expired cookies, whether or not the request carried
/// them (tokens may have arrived by header or body).
pub fn clear(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    jar.add(expired_cookie(ACCESS_COOKIE, settings.secure))
        .add(expired_cookie(REFRESH_COOKIE, settings.secure))
}

fn expired_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    let mut cookie = session_cookie(name, String::new(), 0, secure);
    cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
    cookie
}

fn session_cookie(
    name: &'static str,
    value: String,
    max_age_secs: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(axum::http::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_header_is_used() {
        let map = headers(&[(AUTHORIZATION, "Bearer abc")]);
        assert_eq!(access_token(&map).as_deref(), Some("abc"));
    }

    #[test]
    fn test_cookie_used_without_header() {
        let map = headers(&[(COOKIE, "theme=dark; accessToken=from-cookie")]);
        assert_eq!(access_token(&map).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_malformed_header_does_not_fall_back_to_cookie() {
        let map = headers(&[
            (AUTHORIZATION, "Basic dXNlcjpwdw=="),
            (COOKIE, "accessToken=from-cookie"),
        ]);
        assert_eq!(access_token(&map), None);
    }

    #[test]
    fn test_issued_cookie_attributes() {
        let jar = issue(CookieJar::new(), &CookieSettings::default(), "a", "r");

        let access = jar.get(ACCESS_COOKIE).unwrap();
        assert_eq!(access.value(), "a");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.max_age(), Some(Duration::minutes(15)));

        let refresh = jar.get(REFRESH_COOKIE).unwrap();
        assert_eq!(refresh.max_age(), Some(Duration::days(7)));
        assert_eq!(refresh_token(&jar).as_deref(), Some("r"));
    }

    #[test]
    fn test_clear_expires_cookies_missing_from_request() {
        let jar = clear(CookieJar::new(), &CookieSettings::default());

        for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
            let cookie = jar.get(name).unwrap();
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.path(), Some("/"));
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
            assert!(cookie.to_string().contains("Max-Age=0"));
        }
    }

    #[test]
    fn test_clear_overrides_request_cookies() {
        let map = headers(&[(COOKIE, "accessToken=a; refreshToken=r")]);
        let jar = clear(CookieJar::from_headers(&map), &CookieSettings::default());

        assert_eq!(refresh_token(&jar), None);
        assert_eq!(jar.get(ACCESS_COOKIE).unwrap().value(), "");
    }
}
