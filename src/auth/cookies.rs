//! Set-Cookie values for the refresh flow.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

pub const REFRESH_COOKIE: &str = "refresh_token";
pub const LOGGED_IN_COOKIE: &str = "logged_in";

fn build(
    name: &str,
    value: &str,
    max_age: i64,
    http_only: bool,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}={value}; Path=/; SameSite=Lax; Max-Age={max_age}");
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// HttpOnly cookie carrying the refresh JWT.
pub fn refresh_cookie(token: &str, ttl_seconds: i64, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    build(REFRESH_COOKIE, token, ttl_seconds, true, secure)
}

/// Script-readable hint for the frontend; carries nothing sensitive.
pub fn logged_in_cookie(ttl_seconds: i64, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    build(LOGGED_IN_COOKIE, "true", ttl_seconds, false, secure)
}

pub fn clear_refresh_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    build(REFRESH_COOKIE, "", 0, true, secure)
}

pub fn clear_logged_in_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    build(LOGGED_IN_COOKIE, "", 0, false, secure)
}

/// First value of the named cookie across all `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, val)| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
