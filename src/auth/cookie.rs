//! Session cookie formatting and `Cookie` header parsing.

use axum::http::{header, HeaderMap};
use std::collections::HashMap;

use super::error::{AuthError, AuthResult};

pub const DEFAULT_COOKIE_NAME: &str = "__mgr";

/// Name and scope of the admin session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    // ---
    name: String,
    domain: Option<String>,
}

impl SessionCookie {
    // ---
    pub fn new(name: impl Into<String>, domain: Option<String>) -> Self {
        // ---
        Self {
            name: name.into(),
            domain: domain.filter(|d| !d.is_empty()),
        }
    }

    pub fn name(&self) -> &str {
        // ---
        &self.name
    }

    /// `Set-Cookie` value carrying `token` for `max_age` seconds.
    pub fn issue(&self, token: &str, max_age: i64) -> AuthResult<String> {
        // ---
        self.directives(token, max_age)
    }

    /// `Set-Cookie` value that removes the session from the browser.
    pub fn clear(&self) -> AuthResult<String> {
        // ---
        self.directives("", 0)
    }

    fn directives(&self, value: &str, max_age: i64) -> AuthResult<String> {
        // ---
        let domain = self.domain.as_deref().ok_or(AuthError::MissingCookieDomain)?;

        Ok(format!(
            "{}={value}; Max-Age={max_age}; Path=/; HttpOnly; Secure; SameSite=Lax; Domain={domain}",
            self.name
        ))
    }

    /// Reads this cookie from the request headers. Empty values count as absent.
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        // ---
        let mut cookies = HashMap::new();
        for value in headers.get_all(header::COOKIE) {
            if let Ok(value) = value.to_str() {
                cookies.extend(parse_cookie_header(value));
            }
        }

        cookies.remove(&self.name).filter(|v| !v.is_empty())
    }
}

/// Splits a `Cookie` header on `;`, each pair on its first `=`.
///
/// Pairs without `=` are skipped; a repeated name keeps its last value.
pub fn parse_cookie_header(raw: &str) -> HashMap<String, String> {
    // ---
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| entry.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
