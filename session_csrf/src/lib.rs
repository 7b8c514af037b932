//! session_csrf - Session store and CSRF protection core
//!
//! This crate holds server-side session state, binds one anti-forgery token to
//! each session and distributes it through a client-readable cookie
//! (double-submit cookie). It is framework independent; see
//! `session-csrf-axum` for the HTTP integration.

mod session;
mod storage;
mod utils;

pub use session::{
    CsrfToken, Principal, Session, SessionConfig, SessionError, SessionId, SessionStore,
    is_state_changing, login_session, prepare_logout_response, resolve_session,
    session_id_from_headers, sync_csrf_cookie, token_for, validate, validate_token,
};

pub use utils::{UtilError, get_cookie_value};
