use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::session::config::SessionConfig;
use crate::session::errors::SessionError;
use crate::session::types::{CsrfToken, Principal, Session, SessionId, StoredSession};
use crate::storage::{CacheData, CacheStore, InMemoryCacheStore, RedisCacheStore};
use crate::utils::gen_random_string;

const SESSION_PREFIX: &str = "session";
const SESSION_ID_BYTES: usize = 32;
const SESSION_ID_ATTEMPTS: usize = 4;

/// Authoritative server-side session state.
///
/// Cloning is cheap; every clone talks to the same backend. All reads and
/// writes go through one async mutex, and token binding is a compare-and-swap
/// on the stored record, so a validation read never observes a half-written
/// token.
#[derive(Clone)]
pub struct SessionStore {
    cache: Arc<Mutex<Box<dyn CacheStore>>>,
    config: Arc<SessionConfig>,
}

impl SessionStore {
    /// Builds the backend named by `config.cache_store_type` and verifies it is reachable.
    pub async fn from_config(config: SessionConfig) -> Result<Self, SessionError> {
        tracing::info!(
            "Initializing session store with type: {}",
            config.cache_store_type
        );

        let cache: Box<dyn CacheStore> = match config.cache_store_type.as_str() {
            "memory" => Box::new(InMemoryCacheStore::new()),
            "redis" => {
                let store = RedisCacheStore::open(&config.cache_store_url)?;
                store.init().await.map_err(|e| {
                    tracing::error!("Failed to connect to Redis: {}", e);
                    SessionError::from(e)
                })?;
                Box::new(store)
            }
            t => {
                return Err(SessionError::Config(format!(
                    "Unsupported cache store type: {t}. Supported types are 'memory' and 'redis'"
                )));
            }
        };

        Ok(Self::with_cache(cache, config))
    }

    pub fn in_memory(config: SessionConfig) -> Self {
        Self::with_cache(Box::new(InMemoryCacheStore::new()), config)
    }

    fn with_cache(cache: Box<dyn CacheStore>, config: SessionConfig) -> Self {
        Self {
            cache: Arc::new(Mutex::new(cache)),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Allocates a new authenticated session for `principal`. No CSRF token is
    /// bound yet; that happens on first use.
    pub async fn create(&self, principal: &Principal) -> Result<SessionId, SessionError> {
        let ttl = self.config.session_max_age;
        let stored = StoredSession {
            user_id: principal.id.clone(),
            user_label: principal.label.clone(),
            authenticated: true,
            csrf_token: None,
            expires_at: Utc::now() + Duration::seconds(ttl as i64),
        };
        let cache_data = CacheData::try_from(&stored)?;

        let session_id = self
            .insert_new(cache_data, ttl as usize, || {
                Ok(gen_random_string(SESSION_ID_BYTES)?)
            })
            .await?;
        tracing::debug!("Created session for user {}", principal.id);
        Ok(session_id)
    }

    // Stores `data` under the first id from `next_id` that is not taken yet.
    async fn insert_new<F>(
        &self,
        data: CacheData,
        ttl: usize,
        mut next_id: F,
    ) -> Result<SessionId, SessionError>
    where
        F: FnMut() -> Result<String, SessionError>,
    {
        for _ in 0..SESSION_ID_ATTEMPTS {
            let session_id = next_id()?;
            let stored_new = self
                .cache
                .lock()
                .await
                .put_if_not_exists(SESSION_PREFIX, &session_id, data.clone(), ttl)
                .await?;

            if stored_new {
                return Ok(SessionId::new(session_id));
            }
            tracing::warn!("Session id collision, regenerating");
        }

        Err(SessionError::Storage(format!(
            "No free session id after {SESSION_ID_ATTEMPTS} attempts"
        )))
    }

    /// Loads a live session. Expired sessions are removed and reported as absent.
    pub async fn get(&self, session_id: &SessionId) -> Result<Option<Session>, SessionError> {
        let mut cache = self.cache.lock().await;

        let Some(cached) = cache.get(SESSION_PREFIX, session_id.as_str()).await? else {
            return Ok(None);
        };
        let stored: StoredSession = cached.try_into()?;

        if stored.expires_at < Utc::now() {
            tracing::debug!("Session expired at {}", stored.expires_at);
            cache.remove(SESSION_PREFIX, session_id.as_str()).await?;
            return Ok(None);
        }

        Ok(Some(stored.into_session(session_id.clone())))
    }

    /// Removes the session. Unknown ids are a no-op.
    pub async fn invalidate(&self, session_id: &SessionId) -> Result<(), SessionError> {
        self.cache
            .lock()
            .await
            .remove(SESSION_PREFIX, session_id.as_str())
            .await?;
        tracing::debug!("Session invalidated");
        Ok(())
    }

    /// Binds `candidate` to the session unless a token is already bound, and
    /// returns whichever token ends up bound.
    pub(crate) async fn bind_csrf_token(
        &self,
        session_id: &SessionId,
        candidate: CsrfToken,
    ) -> Result<CsrfToken, SessionError> {
        let mut cache = self.cache.lock().await;

        loop {
            let Some(cached) = cache.get(SESSION_PREFIX, session_id.as_str()).await? else {
                return Err(SessionError::SessionNotFound);
            };
            let mut stored: StoredSession = cached.clone().try_into()?;

            if let Some(existing) = &stored.csrf_token {
                return Ok(CsrfToken::new(existing.clone()));
            }

            stored.csrf_token = Some(candidate.as_str().to_string());
            let updated = CacheData::try_from(&stored)?;

            if cache
                .compare_and_swap(SESSION_PREFIX, session_id.as_str(), &cached, updated)
                .await?
            {
                return Ok(candidate);
            }
            // Another writer changed the record between read and swap; look again.
        }
    }

    #[cfg(test)]
    pub(crate) async fn put_raw(
        &self,
        session_id: &SessionId,
        data: CacheData,
        ttl: usize,
    ) -> Result<(), SessionError> {
        self.cache
            .lock()
            .await
            .put_with_ttl(SESSION_PREFIX, session_id.as_str(), data, ttl)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::main::test_utils::{insert_test_session, test_config, test_store};

    #[tokio::test]
    async fn test_create_and_get() {
        let store = test_store();
        let principal = Principal::new("user-1", "Alice");

        let session_id = store.create(&principal).await.unwrap();
        let session = store.get(&session_id).await.unwrap().unwrap();

        assert_eq!(session.id, session_id);
        assert_eq!(session.principal, principal);
        assert!(session.authenticated);
        // Token generation is deferred to first use
        assert!(session.csrf_token.is_none());
    }

    #[tokio::test]
    async fn test_create_allocates_distinct_ids() {
        let store = test_store();
        let principal = Principal::new("user-1", "Alice");

        let a = store.create(&principal).await.unwrap();
        let b = store.create(&principal).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_get_unknown_session() {
        let store = test_store();
        let result = store.get(&SessionId::new("unknown")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_then_get() {
        let store = test_store();
        let session_id = store
            .create(&Principal::new("user-1", "Alice"))
            .await
            .unwrap();

        store.invalidate(&session_id).await.unwrap();

        assert!(store.get(&session_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent() {
        let store = test_store();
        let session_id = store
            .create(&Principal::new("user-1", "Alice"))
            .await
            .unwrap();

        store.invalidate(&session_id).await.unwrap();
        store.invalidate(&session_id).await.unwrap();
        store
            .invalidate(&SessionId::new("never-existed"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_expired_session_is_removed() {
        let store = test_store();
        let session_id = SessionId::new("expired-session");
        insert_test_session(&store, &session_id, Some("tok"), -60)
            .await
            .unwrap();

        assert!(store.get(&session_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_session_record() {
        let store = test_store();
        store
            .put_raw(
                &SessionId::new("broken"),
                CacheData {
                    value: "{invalid".to_string(),
                },
                60,
            )
            .await
            .unwrap();

        let result = store.get(&SessionId::new("broken")).await;
        assert!(matches!(result, Err(SessionError::Storage(_))));
    }

    #[tokio::test]
    async fn test_bind_csrf_token_first_writer_wins() {
        let store = test_store();
        let session_id = store
            .create(&Principal::new("user-1", "Alice"))
            .await
            .unwrap();

        let first = store
            .bind_csrf_token(&session_id, CsrfToken::new("first"))
            .await
            .unwrap();
        let second = store
            .bind_csrf_token(&session_id, CsrfToken::new("second"))
            .await
            .unwrap();

        assert_eq!(first, CsrfToken::new("first"));
        assert_eq!(second, CsrfToken::new("first"));
        let session = store.get(&session_id).await.unwrap().unwrap();
        assert_eq!(session.csrf_token, Some(CsrfToken::new("first")));
    }

    #[tokio::test]
    async fn test_bind_csrf_token_missing_session() {
        let store = test_store();
        let result = store
            .bind_csrf_token(&SessionId::new("gone"), CsrfToken::new("tok"))
            .await;
        assert!(matches!(result, Err(SessionError::SessionNotFound)));
    }

    #[tokio::test]
    async fn test_from_config_memory() {
        let store = SessionStore::from_config(test_config()).await.unwrap();
        let session_id = store
            .create(&Principal::new("user-1", "Alice"))
            .await
            .unwrap();
        assert!(store.get(&session_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_from_config_rejects_unknown_backend() {
        let mut config = test_config();
        config.cache_store_type = "sqlite".to_string();

        let result = SessionStore::from_config(config).await;
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = test_store();
        let other = store.clone();
        let session_id = store
            .create(&Principal::new("user-1", "Alice"))
            .await
            .unwrap();

        other.invalidate(&session_id).await.unwrap();
        assert!(store.get(&session_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_new_retries_on_collision() {
        let store = test_store();
        let taken = SessionId::new("taken");
        insert_test_session(&store, &taken, None, 60).await.unwrap();

        let mut candidates = vec!["fresh".to_string(), "taken".to_string()];
        let data = CacheData {
            value: "{}".to_string(),
        };
        let session_id = store
            .insert_new(data, 60, || Ok(candidates.pop().unwrap()))
            .await
            .unwrap();

        assert_eq!(session_id, SessionId::new("fresh"));
    }

    #[tokio::test]
    async fn test_insert_new_gives_up_after_collisions() {
        let store = test_store();
        let taken = SessionId::new("taken");
        insert_test_session(&store, &taken, None, 60).await.unwrap();

        let mut calls = 0;
        let data = CacheData {
            value: "{}".to_string(),
        };
        let result = store
            .insert_new(data, 60, || {
                calls += 1;
                Ok("taken".to_string())
            })
            .await;

        assert!(matches!(result, Err(SessionError::Storage(msg)) if msg.contains("No free session id")));
        assert_eq!(calls, SESSION_ID_ATTEMPTS);
    }
}
