use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;

use session_csrf_axum::{
    AuthSession, CurrentSession, Principal, SessionStore, login_response,
};

#[derive(Deserialize)]
pub(crate) struct DevLoginQuery {
    user: String,
    redirect: Option<String>,
}

pub(crate) async fn index(CurrentSession(session): CurrentSession) -> String {
    match session {
        Some(session) if session.authenticated => format!(
            "Hey {}!\n\nPOST /logout with the XSRF-TOKEN cookie echoed in the x-xsrf-token header to log out.\n",
            session.principal.label
        ),
        _ => "Not logged in.\n\nGET /dev/login?user=<name> to start a session.\n".to_string(),
    }
}

pub(crate) async fn protected(AuthSession(session): AuthSession) -> String {
    format!(
        "Protected page for {} (session expires {})\n",
        session.principal.label, session.expires_at
    )
}

/// Development stand-in for an identity provider callback
pub(crate) async fn dev_login(
    State(store): State<SessionStore>,
    Query(params): Query<DevLoginQuery>,
) -> Response {
    tracing::info!("Development login for {}", params.user);
    let principal = Principal::new(format!("dev:{}", params.user), params.user);
    login_response(
        &store,
        &principal,
        params.redirect.as_deref().unwrap_or("/"),
    )
    .await
}
