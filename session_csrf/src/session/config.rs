use http::HeaderName;
use std::sync::LazyLock;

use crate::storage::{GENERIC_CACHE_STORE_TYPE, GENERIC_CACHE_STORE_URL};

const DEFAULT_XSRF_HEADER_NAME: &str = "x-xsrf-token";

pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::var("SESSION_COOKIE_NAME")
        .ok()
        .unwrap_or("__Host-SessionId".to_string())
});

pub static SESSION_COOKIE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    std::env::var("SESSION_COOKIE_MAX_AGE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(600) // Default to 10 minutes if not set or invalid
});

pub static SESSION_COOKIE_SECURE: LazyLock<bool> = LazyLock::new(|| {
    std::env::var("SESSION_COOKIE_SECURE")
        .map(|val| parse_secure_flag(&val))
        .unwrap_or(true)
});

pub static XSRF_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::var("XSRF_COOKIE_NAME")
        .ok()
        .unwrap_or("XSRF-TOKEN".to_string())
});

pub static XSRF_HEADER_NAME: LazyLock<HeaderName> = LazyLock::new(|| {
    let configured = std::env::var("XSRF_HEADER_NAME").ok();
    parse_header_name(configured.as_deref())
});

fn parse_secure_flag(val: &str) -> bool {
    val.to_lowercase() != "false"
}

fn parse_header_name(configured: Option<&str>) -> HeaderName {
    match configured.map(|name| HeaderName::from_bytes(name.as_bytes())) {
        Some(Ok(name)) => name,
        Some(Err(e)) => {
            tracing::warn!(
                "Invalid XSRF_HEADER_NAME ({e}), falling back to {}",
                DEFAULT_XSRF_HEADER_NAME
            );
            HeaderName::from_static(DEFAULT_XSRF_HEADER_NAME)
        }
        None => HeaderName::from_static(DEFAULT_XSRF_HEADER_NAME),
    }
}

/// Settings shared by the session store, the CSRF token manager and the
/// HTTP layer.
///
/// `Default` takes every value from the environment (see the statics in this
/// module). Construct it directly to override individual settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name of the session-identifying cookie
    pub session_cookie_name: String,
    /// Session lifetime in seconds, also used as cookie `Max-Age`
    pub session_max_age: u64,
    /// Whether issued cookies carry the `Secure` attribute.
    /// A `__Host-` cookie name requires this to be true in browsers.
    pub secure_cookies: bool,
    /// Name of the client-readable CSRF cookie
    pub csrf_cookie_name: String,
    /// Header the client echoes the CSRF cookie in
    pub csrf_header_name: HeaderName,
    /// "memory" or "redis"
    pub cache_store_type: String,
    pub cache_store_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: SESSION_COOKIE_NAME.clone(),
            session_max_age: *SESSION_COOKIE_MAX_AGE,
            secure_cookies: *SESSION_COOKIE_SECURE,
            csrf_cookie_name: XSRF_COOKIE_NAME.clone(),
            csrf_header_name: XSRF_HEADER_NAME.clone(),
            cache_store_type: GENERIC_CACHE_STORE_TYPE.clone(),
            cache_store_url: GENERIC_CACHE_STORE_URL.clone(),
        }
    }
}
