use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use headers::{Cookie, HeaderMapExt};
use http::header::{HeaderMap, SET_COOKIE};
use ring::rand::SecureRandom;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),
}

/// Attributes that differ between the cookies this crate issues.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CookieAttrs {
    /// Hide the cookie from scripts. Must be false for the CSRF cookie.
    pub(crate) http_only: bool,
    pub(crate) secure: bool,
}

pub(crate) fn base64url_encode(input: Vec<u8>) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Random bytes from the system CSPRNG, base64url encoded without padding.
pub(crate) fn gen_random_string(len: usize) -> Result<String, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random string".to_string()))?;
    Ok(base64url_encode(bytes))
}

pub(crate) fn header_set_cookie<'a>(
    headers: &'a mut HeaderMap,
    name: &str,
    value: &str,
    max_age: i64,
    attrs: CookieAttrs,
) -> Result<&'a HeaderMap, UtilError> {
    let mut cookie = format!("{name}={value}; SameSite=Lax; Path=/; Max-Age={max_age}");
    if attrs.secure {
        cookie.push_str("; Secure");
    }
    if attrs.http_only {
        cookie.push_str("; HttpOnly");
    }
    headers.append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| UtilError::Cookie(format!("Failed to build cookie {name}")))?,
    );
    Ok(headers)
}

/// Looks up a cookie by name across every `Cookie` header of a request.
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .typed_get::<Cookie>()
        .and_then(|cookies| cookies.get(name).map(str::to_string))
}
