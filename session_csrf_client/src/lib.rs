//! session_csrf_client - Client side of the double-submit cookie scheme
//!
//! [`SessionProxy`] keeps the cookies a `session-csrf` protected server
//! issues, echoes the CSRF cookie in the CSRF header on state-changing
//! requests and tracks whether the user is logged in.

mod errors;
mod proxy;

pub use errors::ClientError;
pub use proxy::{DEFAULT_CSRF_COOKIE_NAME, DEFAULT_CSRF_HEADER_NAME, SessionProxy};
