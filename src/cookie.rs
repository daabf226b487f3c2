//! Session Cookie Manager
//!
//! Binds the refresh token to an HTTP cookie. The cookie is script-proof
//! (HttpOnly), TLS-only (Secure), and cross-site (SameSite=None) so the
//! browser sends it to the refresh endpoint from any frontend origin.

use crate::error::AuthError;

use axum::http::{header, HeaderMap, HeaderValue};

/// Cookie slot carrying the refresh token
pub const SESSION_COOKIE: &str = "jwt";

/// Build the `Set-Cookie` value issued at login
pub fn build_session_cookie(token: &str, max_age: i64) -> Result<HeaderValue, AuthError> {
    let cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; Secure; SameSite=None; Max-Age={max_age}"
    );

    HeaderValue::from_str(&cookie).map_err(|err| {
        tracing::error!("Failed to build session cookie: {:?}", err);
        AuthError::Internal
    })
}

/// Build the `Set-Cookie` value that clears the session at logout
///
/// A cookie can only be cleared with the attributes it was set with, so
/// these must stay in lockstep with [`build_session_cookie`].
pub fn build_clear_cookie() -> HeaderValue {
    HeaderValue::from_static(
        "jwt=; Path=/; HttpOnly; Secure; SameSite=None; Max-Age=0",
    )
}

/// Read the refresh token out of the request's `Cookie` header, if present
pub fn read_session_cookie(headers: &HeaderMap) -> Option<String> {
    let prefix = format!("{SESSION_COOKIE}=");
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .filter_map(|pair| pair.trim().strip_prefix(prefix.as_str()))
        .next()
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let cookie = build_session_cookie("tok123", 604800).unwrap();
        let value = cookie.to_str().unwrap();

        assert!(value.starts_with("jwt=tok123;"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("SameSite=None"));
        assert!(value.contains("Max-Age=604800"));
        assert!(value.contains("Path=/"));
    }

    #[test]
    fn clear_cookie_matches_creation_attributes() {
        let set = build_session_cookie("tok", 60).unwrap();
        let clear = build_clear_cookie();
        let clear = clear.to_str().unwrap();

        assert!(clear.contains("Max-Age=0"));
        // Attribute set must match the one used at creation.
        for attr in ["Path=/", "HttpOnly", "Secure", "SameSite=None"] {
            assert!(set.to_str().unwrap().contains(attr));
            assert!(clear.contains(attr));
        }
    }

    #[test]
    fn read_cookie_from_multi_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; jwt=abc.def.ghi; lang=en"),
        );

        assert_eq!(read_session_cookie(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn read_cookie_absent() {
        assert_eq!(read_session_cookie(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(read_session_cookie(&headers), None);
    }
}
