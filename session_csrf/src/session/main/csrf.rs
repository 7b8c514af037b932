use http::{HeaderMap, Method};
use subtle::ConstantTimeEq;

use crate::session::config::SessionConfig;
use crate::session::errors::SessionError;
use crate::session::types::{CsrfToken, Session};
use crate::utils::{gen_random_string, get_cookie_value};

use super::cookie::set_csrf_cookie;
use super::store::SessionStore;

const CSRF_TOKEN_BYTES: usize = 32;

/// Returns the token bound to `session`, generating and binding one if none
/// exists yet. Stable for the lifetime of the session.
///
/// `session.csrf_token` is updated to the bound value.
pub async fn token_for(
    store: &SessionStore,
    session: &mut Session,
) -> Result<CsrfToken, SessionError> {
    if let Some(token) = &session.csrf_token {
        return Ok(token.clone());
    }

    let candidate = CsrfToken::new(gen_random_string(CSRF_TOKEN_BYTES)?);
    let bound = store.bind_csrf_token(&session.id, candidate).await?;
    tracing::debug!("CSRF token bound to session");

    session.csrf_token = Some(bound.clone());
    Ok(bound)
}

/// True iff the session has a bound token and `presented` equals it exactly.
pub fn validate(session: &Session, presented: Option<&str>) -> bool {
    validate_token(session.csrf_token.as_ref(), presented)
}

/// Pure comparison of a bound token against a client-presented value.
/// Missing or empty values on either side never validate.
pub fn validate_token(bound: Option<&CsrfToken>, presented: Option<&str>) -> bool {
    match (bound, presented) {
        (Some(bound), Some(presented)) if !bound.as_str().is_empty() && !presented.is_empty() => {
            bound.as_str().as_bytes().ct_eq(presented.as_bytes()).into()
        }
        _ => false,
    }
}

/// Everything except GET, HEAD, OPTIONS and TRACE needs a CSRF check.
pub fn is_state_changing(method: &Method) -> bool {
    !method.is_safe()
}

/// Emits a CSRF cookie carrying `token` unless the request already presented
/// that exact value. Returns true when a `Set-Cookie` was appended.
pub fn sync_csrf_cookie(
    config: &SessionConfig,
    request_headers: &HeaderMap,
    token: &CsrfToken,
    response_headers: &mut HeaderMap,
) -> Result<bool, SessionError> {
    let current = get_cookie_value(request_headers, &config.csrf_cookie_name);
    if current.as_deref() == Some(token.as_str()) {
        return Ok(false);
    }

    if current.is_some() {
        tracing::debug!("CSRF cookie is stale, reissuing");
    } else {
        tracing::debug!("CSRF cookie missing, issuing");
    }
    set_csrf_cookie(config, token, response_headers)?;
    Ok(true)
}
