mod cookie;
mod csrf;
mod session;
mod store;

#[cfg(test)]
mod test_utils;

pub use csrf::{is_state_changing, sync_csrf_cookie, token_for, validate, validate_token};
pub use session::{
    login_session, prepare_logout_response, resolve_session, session_id_from_headers,
};
pub use store::SessionStore;
