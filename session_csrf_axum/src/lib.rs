//! Axum integration for `session-csrf`
//!
//! - [`protect`] installs the CSRF filter in front of every route of an application router.
//! - [`session_csrf_router`] provides `POST /logout` and `GET /user`.
//! - [`CurrentSession`] and [`AuthSession`] hand the resolved session to handlers.
//! - [`login_response`] is what an identity-provider callback calls once a user is authenticated.

mod config;
mod error;
mod handlers;
mod middleware;
mod router;
mod session;

pub use config::SESSION_REDIRECT_ANON;
pub use error::IntoResponseError;
pub use handlers::{LogoutResponse, UserStatus, login_response};
pub use middleware::{csrf_filter, protect};
pub use router::{session_csrf_router, session_csrf_router_no_trace};
pub use session::{AuthRedirect, AuthSession, CurrentSession, RequestSession};

// Re-export the core types handlers and applications need
pub use session_csrf::{
    CsrfToken, Principal, Session, SessionConfig, SessionError, SessionId, SessionStore,
};
