//! Cookie helper for the session, CSRF and flash cookies.
//!
//! All cookies are scoped to `/` with `SameSite=Lax`. The `Secure` flag
//! follows `security.secure_cookies`.

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};

/// Session token cookie.
pub const SESSION_COOKIE: &str = "sessionid";
/// Per-browser CSRF nonce cookie.
pub const CSRF_COOKIE: &str = "csrftoken";
/// One-shot flash message cookie.
pub const FLASH_COOKIE: &str = "flash";

/// CSRF nonces live for a year.
pub const CSRF_COOKIE_MAX_AGE_SECS: i64 = 365 * 24 * 60 * 60;
/// Flash messages must be read within five minutes.
pub const FLASH_COOKIE_MAX_AGE_SECS: i64 = 300;

#[derive(Debug, Clone)]
pub struct CookieHelper {
    secure: bool,
    session_max_age_secs: i64,
}

impl CookieHelper {
    pub fn new(secure: bool, session_ttl_hours: i64) -> Self {
        Self {
            secure,
            session_max_age_secs: session_ttl_hours * 3600,
        }
    }

    pub fn build_session_cookie(&self, token: &str) -> String {
        self.build_cookie(SESSION_COOKIE, token, self.session_max_age_secs)
    }

    pub fn build_clear_session_cookie(&self) -> String {
        self.build_clear_cookie(SESSION_COOKIE)
    }

    pub fn build_csrf_cookie(&self, nonce: &str) -> String {
        self.build_cookie(CSRF_COOKIE, nonce, CSRF_COOKIE_MAX_AGE_SECS)
    }

    pub fn build_flash_cookie(&self, encoded: &str) -> String {
        self.build_cookie(FLASH_COOKIE, encoded, FLASH_COOKIE_MAX_AGE_SECS)
    }

    pub fn build_clear_flash_cookie(&self) -> String {
        self.build_clear_cookie(FLASH_COOKIE)
    }

    /// Append a Set-Cookie header. Values that are not valid header text are skipped.
    pub fn append(headers: &mut HeaderMap, cookie: &str) {
        if let Ok(value) = HeaderValue::from_str(cookie) {
            headers.append(SET_COOKIE, value);
        }
    }

    /// True when the response already sets cookie `name`.
    pub fn is_set(headers: &HeaderMap, name: &str) -> bool {
        let prefix = format!("{}=", name);
        headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.starts_with(&prefix))
    }

    /// Extract a cookie value from request headers by name.
    pub fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers
            .get_all(axum::http::header::COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(|cookie_header| cookie_header.split(';'))
            .map(|s| s.trim())
            .find_map(|cookie| {
                let (cookie_name, cookie_value) = cookie.split_once('=')?;
                if cookie_name == name && !cookie_value.is_empty() {
                    Some(cookie_value)
                } else {
                    None
                }
            })
    }

    /// Build a cookie string with all security attributes.
    fn build_cookie(&self, name: &str, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            name, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Build a cookie string that clears an existing cookie.
    fn build_clear_cookie(&self, name: &str) -> String {
        let mut cookie = format!(
            "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax",
            name
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}
