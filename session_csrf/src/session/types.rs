use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::errors::SessionError;
use crate::storage::CacheData;

/// Opaque, unguessable session identifier carried in the session cookie
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anti-forgery token bound to one session
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep token values out of logs
impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfToken(..)")
    }
}

/// Authenticated identity handed over by the identity provider login flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable identifier of the user at the identity provider
    pub id: String,
    /// Display value shown by the UI
    pub label: String,
}

impl Principal {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Server-side session state as seen by request handlers
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub principal: Principal,
    pub authenticated: bool,
    pub csrf_token: Option<CsrfToken>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoredSession {
    pub(crate) user_id: String,
    pub(crate) user_label: String,
    pub(crate) authenticated: bool,
    pub(crate) csrf_token: Option<String>,
    pub(crate) expires_at: DateTime<Utc>,
}

impl StoredSession {
    pub(crate) fn into_session(self, id: SessionId) -> Session {
        Session {
            id,
            principal: Principal {
                id: self.user_id,
                label: self.user_label,
            },
            authenticated: self.authenticated,
            csrf_token: self.csrf_token.map(CsrfToken),
            expires_at: self.expires_at,
        }
    }
}

impl TryFrom<&StoredSession> for CacheData {
    type Error = SessionError;

    fn try_from(data: &StoredSession) -> Result<Self, Self::Error> {
        Ok(Self {
            value: serde_json::to_string(data).map_err(|e| SessionError::Storage(e.to_string()))?,
        })
    }
}

impl TryFrom<CacheData> for StoredSession {
    type Error = SessionError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value).map_err(|e| SessionError::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> StoredSession {
        StoredSession {
            user_id: "user-1".to_string(),
            user_label: "Alice".to_string(),
            authenticated: true,
            csrf_token: None,
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn test_stored_session_cache_data_conversion() {
        let original = stored();
        let cache_data = CacheData::try_from(&original).unwrap();
        let restored = StoredSession::try_from(cache_data).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_stored_session_record_fields() {
        let cache_data = CacheData::try_from(&stored()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&cache_data.value).unwrap();
        let mut keys: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "authenticated",
                "csrf_token",
                "expires_at",
                "user_id",
                "user_label"
            ]
        );
    }

    #[test]
    fn test_malformed_cache_data() {
        let cache_data = CacheData {
            value: "{not json".to_string(),
        };
        assert!(matches!(
            StoredSession::try_from(cache_data),
            Err(SessionError::Storage(_))
        ));
    }

    #[test]
    fn test_into_session() {
        let mut data = stored();
        data.csrf_token = Some("tok".to_string());
        let session = data.into_session(SessionId::new("sid"));

        assert_eq!(session.id.as_str(), "sid");
        assert_eq!(session.principal, Principal::new("user-1", "Alice"));
        assert!(session.authenticated);
        assert_eq!(session.csrf_token, Some(CsrfToken::new("tok")));
    }

    #[test]
    fn test_csrf_token_debug_is_redacted() {
        let token = CsrfToken::new("super-secret");
        assert!(!format!("{token:?}").contains("super-secret"));
    }
}
