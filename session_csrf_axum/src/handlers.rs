use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};

use super::config::{SESSION_REDIRECT_ANON, local_redirect};
use super::error::IntoResponseError;
use super::session::{CurrentSession, RequestSession};
use session_csrf::{Principal, SessionStore, login_session, prepare_logout_response};

#[derive(Deserialize)]
pub(super) struct RedirectQuery {
    redirect: Option<String>,
}

/// Body of a successful `POST /logout` without a `redirect` parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Route the client should navigate to now that it is logged out
    pub redirect: String,
}

/// Body of `GET /user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatus {
    pub authenticated: bool,
    /// Display value of the logged-in user
    pub user: Option<String>,
}

/// Handles logout requests with optional redirection
///
/// Invalidates the session named by the session cookie and expires that
/// cookie. Unknown or already invalidated sessions are not an error. Without
/// a `redirect` parameter the landing route is returned as JSON; with one,
/// the client is redirected (303) to it if it is a local path, or to the
/// landing route otherwise.
pub(super) async fn logout(
    State(store): State<SessionStore>,
    resolved: RequestSession,
    Query(params): Query<RedirectQuery>,
) -> Response {
    let headers = match prepare_logout_response(&store, resolved.id.as_ref())
        .await
        .into_response_error()
    {
        Ok(headers) => headers,
        Err(e) => return e.into_response(),
    };

    match params.redirect {
        Some(redirect_to) => {
            let target = local_redirect(&redirect_to).unwrap_or(SESSION_REDIRECT_ANON.as_str());
            tracing::debug!("Redirecting to {}", target);
            (headers, Redirect::to(target)).into_response()
        }
        None => {
            tracing::debug!("No redirect specified, returning landing route");
            let body = LogoutResponse {
                redirect: SESSION_REDIRECT_ANON.clone(),
            };
            (headers, Json(body)).into_response()
        }
    }
}

/// Reports whether the request carries a live authenticated session.
pub(super) async fn user_status(CurrentSession(session): CurrentSession) -> Json<UserStatus> {
    let status = match session {
        Some(session) if session.authenticated => UserStatus {
            authenticated: true,
            user: Some(session.principal.label),
        },
        _ => UserStatus {
            authenticated: false,
            user: None,
        },
    };
    Json(status)
}

/// Completes a login handed over by the identity provider flow.
///
/// Creates the session, sets the session cookie and redirects (303) to
/// `redirect` (local paths only, the landing route otherwise). The new
/// session id travels as a response extension so that [`crate::csrf_filter`]
/// attaches the first CSRF cookie to this same response.
pub async fn login_response(store: &SessionStore, principal: &Principal, redirect: &str) -> Response {
    let (session_id, headers) = match login_session(store, principal)
        .await
        .into_response_error()
    {
        Ok(created) => created,
        Err(e) => return e.into_response(),
    };

    let target = local_redirect(redirect).unwrap_or(SESSION_REDIRECT_ANON.as_str());
    let mut response = (headers, Redirect::to(target)).into_response();
    response.extensions_mut().insert(session_id);
    response
}
