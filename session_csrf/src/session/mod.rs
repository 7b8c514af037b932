mod config;
mod errors;
mod main;
mod types;

pub use config::SessionConfig;
pub use errors::SessionError;
pub use main::{
    SessionStore, is_state_changing, login_session, prepare_logout_response, resolve_session,
    session_id_from_headers, sync_csrf_cookie, token_for, validate, validate_token,
};
pub use types::{CsrfToken, Principal, Session, SessionId};
