use http::StatusCode;
use session_csrf::SessionError;

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

pub(crate) fn status_for(err: &SessionError) -> StatusCode {
    match err {
        SessionError::CsrfToken(_) => StatusCode::FORBIDDEN,
        SessionError::SessionNotFound => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Implementation for SessionError to map variants to appropriate status codes
impl<T> IntoResponseError<T> for Result<T, SessionError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!("Session error: {}", e);
                // Storage details stay in the log
                (status, "Internal server error".to_string())
            } else {
                (status, e.to_string())
            }
        })
    }
}
