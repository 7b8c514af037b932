use http::HeaderMap;

use crate::session::errors::SessionError;
use crate::session::types::{Principal, Session, SessionId};
use crate::utils::get_cookie_value;

use super::cookie::{clear_session_cookie, set_session_cookie};
use super::store::SessionStore;

/// Entry point for the identity provider login flow: creates an
/// authenticated session for `principal` and returns the headers that set
/// the session cookie.
pub async fn login_session(
    store: &SessionStore,
    principal: &Principal,
) -> Result<(SessionId, HeaderMap), SessionError> {
    let session_id = store.create(principal).await?;

    let mut headers = HeaderMap::new();
    set_session_cookie(store.config(), &session_id, &mut headers)?;

    tracing::debug!("Created session cookie for user {}", principal.id);
    Ok((session_id, headers))
}

/// Prepare a logout response by removing the session from storage and
/// expiring the session cookie.
///
/// Logging out without a session, or with one that is already gone, is not
/// an error; the cookie is cleared either way.
pub async fn prepare_logout_response(
    store: &SessionStore,
    session_id: Option<&SessionId>,
) -> Result<HeaderMap, SessionError> {
    if let Some(session_id) = session_id {
        store.invalidate(session_id).await?;
    } else {
        tracing::debug!("Logout without session cookie");
    }

    let mut headers = HeaderMap::new();
    clear_session_cookie(store.config(), &mut headers)?;
    Ok(headers)
}

pub fn session_id_from_headers(store: &SessionStore, headers: &HeaderMap) -> Option<SessionId> {
    let cookie_name = store.config().session_cookie_name.as_str();
    let session_id = get_cookie_value(headers, cookie_name).filter(|id| !id.is_empty());

    if session_id.is_none() {
        tracing::debug!("No session cookie '{}' found in cookies", cookie_name);
    }
    session_id.map(SessionId::new)
}

/// Loads the live session named by the request's session cookie, if any.
pub async fn resolve_session(
    store: &SessionStore,
    headers: &HeaderMap,
) -> Result<Option<Session>, SessionError> {
    let Some(session_id) = session_id_from_headers(store, headers) else {
        return Ok(None);
    };
    store.get(&session_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::main::test_utils::test_store;
    use http::header::{COOKIE, SET_COOKIE};

    fn cookie_headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, value.parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn test_login_session_sets_cookie() {
        let store = test_store();
        let (session_id, headers) = login_session(&store, &Principal::new("user-1", "Alice"))
            .await
            .unwrap();

        let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with(&format!("SessionId={session_id};")));
        assert!(store.get(&session_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_resolve_session() {
        let store = test_store();
        let (session_id, _) = login_session(&store, &Principal::new("user-1", "Alice"))
            .await
            .unwrap();

        let headers = cookie_headers(&format!("other=1; SessionId={session_id}"));
        let session = resolve_session(&store, &headers).await.unwrap().unwrap();
        assert_eq!(session.id, session_id);
        assert_eq!(session.principal.label, "Alice");
    }

    #[tokio::test]
    async fn test_resolve_session_without_cookie() {
        let store = test_store();
        assert!(
            resolve_session(&store, &HeaderMap::new())
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            resolve_session(&store, &cookie_headers("SessionId="))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_resolve_unknown_session() {
        let store = test_store();
        let headers = cookie_headers("SessionId=does-not-exist");
        assert!(resolve_session(&store, &headers).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let store = test_store();
        let (session_id, _) = login_session(&store, &Principal::new("user-1", "Alice"))
            .await
            .unwrap();

        let headers = prepare_logout_response(&store, Some(&session_id))
            .await
            .unwrap();

        let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("SessionId=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(store.get(&session_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_twice_and_unknown_session() {
        let store = test_store();
        let (session_id, _) = login_session(&store, &Principal::new("user-1", "Alice"))
            .await
            .unwrap();

        assert!(
            prepare_logout_response(&store, Some(&session_id))
                .await
                .is_ok()
        );
        assert!(
            prepare_logout_response(&store, Some(&session_id))
                .await
                .is_ok()
        );
        assert!(
            prepare_logout_response(&store, Some(&SessionId::new("unknown")))
                .await
                .is_ok()
        );
        assert!(prepare_logout_response(&store, None).await.is_ok());
    }
}
