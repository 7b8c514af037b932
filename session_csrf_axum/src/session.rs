use axum::{
    extract::FromRequestParts,
    response::{IntoResponse, Redirect, Response},
};
use http::{Method, StatusCode, request::Parts};

use super::config::SESSION_REDIRECT_ANON;
use session_csrf::{Session, SessionId};

/// What the CSRF filter resolved for the current request.
///
/// Inserted as a request extension by [`crate::csrf_filter`] before the
/// handler runs, so handlers receive the session explicitly instead of
/// looking it up again.
#[derive(Clone, Debug, Default)]
pub struct RequestSession {
    /// Session id from the request cookie, whether or not it is still live
    pub id: Option<SessionId>,
    /// The live session, if the cookie named one
    pub session: Option<Session>,
}

fn request_session(parts: &Parts) -> Result<RequestSession, (StatusCode, &'static str)> {
    parts
        .extensions
        .get::<RequestSession>()
        .cloned()
        .ok_or_else(|| {
            tracing::error!("RequestSession missing; is the router wrapped with protect()?");
            (StatusCode::INTERNAL_SERVER_ERROR, "Session filter not installed")
        })
}

impl<S> FromRequestParts<S> for RequestSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        request_session(parts)
    }
}

/// The live session of the request, or `None` for anonymous requests
#[derive(Clone, Debug)]
pub struct CurrentSession(pub Option<Session>);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentSession(request_session(parts)?.session))
    }
}

pub struct AuthRedirect {
    method: Method,
}

impl AuthRedirect {
    fn new(method: Method) -> Self {
        Self { method }
    }

    fn into_response_with_method(self) -> Response {
        if self.method == Method::GET {
            tracing::debug!("Redirecting to {}", SESSION_REDIRECT_ANON.as_str());
            Redirect::temporary(SESSION_REDIRECT_ANON.as_str()).into_response()
        } else {
            tracing::debug!("Unauthorized");
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        self.into_response_with_method()
    }
}

/// An authenticated session, available as an Axum extractor
///
/// Rejects anonymous requests: `GET` is redirected to the landing route,
/// everything else gets `401 Unauthorized`. CSRF validation has already
/// happened in the filter by the time this runs.
///
/// # Example
///
/// ```no_run
/// use axum::{routing::get, Router};
/// use session_csrf_axum::AuthSession;
///
/// async fn protected_handler(AuthSession(session): AuthSession) -> String {
///     format!("Hello, {}!", session.principal.label)
/// }
///
/// let app: Router = Router::new()
///     .route("/protected", get(protected_handler));
/// ```
#[derive(Clone, Debug)]
pub struct AuthSession(pub Session);

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        let resolved = request_session(parts).map_err(IntoResponse::into_response)?;

        match resolved.session {
            Some(session) if session.authenticated => Ok(AuthSession(session)),
            _ => Err(AuthRedirect::new(parts.method.clone()).into_response()),
        }
    }
}
