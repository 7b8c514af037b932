use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::{HeaderMap, header::COOKIE};

use super::error::IntoResponseError;
use super::session::RequestSession;
use session_csrf::{
    CsrfToken, Session, SessionError, SessionId, SessionStore, get_cookie_value, is_state_changing,
    session_id_from_headers, sync_csrf_cookie, token_for, validate, validate_token,
};

/// Wraps every route of `router` with [`csrf_filter`].
///
/// Call this after all routes are added; routes added later are not covered.
pub fn protect<S>(router: Router<S>, store: SessionStore) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(axum::middleware::from_fn_with_state(store, csrf_filter))
}

/// Request filter: CSRF gate before the handler, CSRF cookie sync after it.
///
/// State-changing requests must echo the CSRF cookie in the CSRF header.
/// With a live session the header is compared against the token bound to the
/// session; without one there is nothing server-side to bind to, so the
/// header is compared against the request's own CSRF cookie. Failures are
/// answered with `403 Forbidden` and the handler never runs; a live session
/// still gets its CSRF cookie reissued on that response.
pub async fn csrf_filter(
    State(store): State<SessionStore>,
    mut req: Request,
    next: Next,
) -> Response {
    let session_id = session_id_from_headers(&store, req.headers());
    let session = match &session_id {
        Some(id) => match store.get(id).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Failed to load session: {}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
            }
        },
        None => None,
    };

    let request_cookies = cookie_headers(req.headers());

    if is_state_changing(req.method()) {
        if let Err((status, message)) =
            check_csrf(&store, req.headers(), session.as_ref()).into_response_error()
        {
            tracing::warn!("Rejecting {} {}: {}", req.method(), req.uri().path(), message);
            let mut response = (status, message).into_response();
            // The client may have lost its CSRF cookie; hand it back so it can retry
            if let Some(session) = &session {
                sync_outbound(&store, &request_cookies, &session.id, &mut response).await;
            }
            return response;
        }
        tracing::trace!("CSRF header verified");
    }

    req.extensions_mut().insert(RequestSession {
        id: session_id.clone(),
        session,
    });

    let mut response = next.run(req).await;

    // A session created by the handler (login) takes precedence over the request's one
    let sync_id = response
        .extensions()
        .get::<SessionId>()
        .cloned()
        .or(session_id);
    if let Some(sync_id) = sync_id {
        sync_outbound(&store, &request_cookies, &sync_id, &mut response).await;
    }

    response
}

fn check_csrf(
    store: &SessionStore,
    headers: &HeaderMap,
    session: Option<&Session>,
) -> Result<(), SessionError> {
    let config = store.config();
    let Some(presented) = headers
        .get(&config.csrf_header_name)
        .and_then(|h| h.to_str().ok())
    else {
        return Err(SessionError::CsrfToken("CSRF token missing".to_string()));
    };

    let valid = match session {
        Some(session) => validate(session, Some(presented)),
        None => {
            let cookie = get_cookie_value(headers, &config.csrf_cookie_name).map(CsrfToken::new);
            validate_token(cookie.as_ref(), Some(presented))
        }
    };

    if valid {
        Ok(())
    } else {
        Err(SessionError::CsrfToken("CSRF token mismatch".to_string()))
    }
}

fn cookie_headers(headers: &HeaderMap) -> HeaderMap {
    let mut cookies = HeaderMap::new();
    for value in headers.get_all(COOKIE) {
        cookies.append(COOKIE, value.clone());
    }
    cookies
}

// Reloads the session so a logout performed by the handler is observed.
async fn sync_outbound(
    store: &SessionStore,
    request_cookies: &HeaderMap,
    session_id: &SessionId,
    response: &mut Response,
) {
    let mut session = match store.get(session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            tracing::debug!("No live session after handler, CSRF cookie left as is");
            return;
        }
        Err(e) => {
            tracing::error!("Failed to reload session for CSRF cookie sync: {}", e);
            return;
        }
    };

    let token = match token_for(store, &mut session).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to bind CSRF token: {}", e);
            return;
        }
    };

    if let Err(e) = sync_csrf_cookie(
        store.config(),
        request_cookies,
        &token,
        response.headers_mut(),
    ) {
        tracing::error!("Failed to set CSRF cookie: {}", e);
    }
}
