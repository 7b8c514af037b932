//! Configuration for the HTTP layer

use std::sync::LazyLock;

/// Unauthenticated landing route the client is sent to after logout, and
/// where `GET` requests without a session are redirected by [`crate::AuthSession`].
/// Default: "/"
pub static SESSION_REDIRECT_ANON: LazyLock<String> =
    LazyLock::new(|| std::env::var("SESSION_REDIRECT_ANON").unwrap_or_else(|_| "/".to_string()));

/// Accepts only same-site paths such as `/home`; anything else, including
/// protocol-relative `//host` URLs, is rejected.
pub(crate) fn local_redirect(target: &str) -> Option<&str> {
    let is_local = target.starts_with('/') && !target.starts_with("//") && !target.contains('\\');
    is_local.then_some(target)
}
