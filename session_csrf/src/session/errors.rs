use thiserror::Error;

use crate::storage::StorageError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(String),

    /// Missing or mismatched CSRF header on a state-changing request
    #[error("CSRF token error: {0}")]
    CsrfToken(String),

    /// The session vanished (expired or logged out) while a request was using it
    #[error("Session not found")]
    SessionNotFound,

    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error() {
        let err = SessionError::from(StorageError::Storage("down".to_string()));
        assert!(matches!(err, SessionError::Storage(msg) if msg == "Storage error: down"));
    }

    #[test]
    fn test_from_util_error() {
        let err: SessionError = UtilError::Crypto("rng".to_string()).into();
        assert_eq!(err.to_string(), "Utils error: Crypto error: rng");
    }
}
