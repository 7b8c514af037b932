//! Test utilities for session module tests

use chrono::{Duration, Utc};
use http::HeaderName;

use crate::session::config::SessionConfig;
use crate::session::errors::SessionError;
use crate::session::main::store::SessionStore;
use crate::session::types::{SessionId, StoredSession};
use crate::storage::CacheData;

/// Configuration with fixed names, independent of the process environment
pub(crate) fn test_config() -> SessionConfig {
    SessionConfig {
        session_cookie_name: "SessionId".to_string(),
        session_max_age: 600,
        secure_cookies: true,
        csrf_cookie_name: "XSRF-TOKEN".to_string(),
        csrf_header_name: HeaderName::from_static("x-xsrf-token"),
        cache_store_type: "memory".to_string(),
        cache_store_url: String::new(),
    }
}

pub(crate) fn test_store() -> SessionStore {
    SessionStore::in_memory(test_config())
}

/// Insert a session record directly, bypassing `create`.
/// A negative `expires_in` produces a session that is already expired.
pub(crate) async fn insert_test_session(
    store: &SessionStore,
    session_id: &SessionId,
    csrf_token: Option<&str>,
    expires_in: i64,
) -> Result<(), SessionError> {
    let stored = StoredSession {
        user_id: "test-user".to_string(),
        user_label: "Test User".to_string(),
        authenticated: true,
        csrf_token: csrf_token.map(str::to_string),
        expires_at: Utc::now() + Duration::seconds(expires_in),
    };

    store
        .put_raw(session_id, CacheData::try_from(&stored)?, 600)
        .await
}
