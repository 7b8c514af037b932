use http::HeaderMap;

use crate::session::config::SessionConfig;
use crate::session::errors::SessionError;
use crate::session::types::{CsrfToken, SessionId};
use crate::utils::{CookieAttrs, header_set_cookie};

pub(super) fn set_session_cookie(
    config: &SessionConfig,
    session_id: &SessionId,
    headers: &mut HeaderMap,
) -> Result<(), SessionError> {
    header_set_cookie(
        headers,
        &config.session_cookie_name,
        session_id.as_str(),
        config.session_max_age as i64,
        CookieAttrs {
            http_only: true,
            secure: config.secure_cookies,
        },
    )?;
    Ok(())
}

/// Tells the client to drop the session cookie
pub(super) fn clear_session_cookie(
    config: &SessionConfig,
    headers: &mut HeaderMap,
) -> Result<(), SessionError> {
    header_set_cookie(
        headers,
        &config.session_cookie_name,
        "",
        0,
        CookieAttrs {
            http_only: true,
            secure: config.secure_cookies,
        },
    )?;
    Ok(())
}

/// The CSRF cookie has to stay readable by same-origin scripts, so no HttpOnly.
pub(super) fn set_csrf_cookie(
    config: &SessionConfig,
    token: &CsrfToken,
    headers: &mut HeaderMap,
) -> Result<(), SessionError> {
    header_set_cookie(
        headers,
        &config.csrf_cookie_name,
        token.as_str(),
        config.session_max_age as i64,
        CookieAttrs {
            http_only: false,
            secure: config.secure_cookies,
        },
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::main::test_utils::test_config;
    use http::header::SET_COOKIE;

    fn set_cookie(headers: &HeaderMap) -> &str {
        headers.get(SET_COOKIE).unwrap().to_str().unwrap()
    }

    #[test]
    fn test_session_cookie_is_http_only() {
        let mut headers = HeaderMap::new();
        set_session_cookie(&test_config(), &SessionId::new("sid"), &mut headers).unwrap();

        let cookie = set_cookie(&headers);
        assert!(cookie.starts_with("SessionId=sid;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=600"));
    }

    #[test]
    fn test_clear_session_cookie() {
        let mut headers = HeaderMap::new();
        clear_session_cookie(&test_config(), &mut headers).unwrap();

        let cookie = set_cookie(&headers);
        assert!(cookie.starts_with("SessionId=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_csrf_cookie_is_script_readable() {
        let mut headers = HeaderMap::new();
        set_csrf_cookie(&test_config(), &CsrfToken::new("tok"), &mut headers).unwrap();

        let cookie = set_cookie(&headers);
        assert!(cookie.starts_with("XSRF-TOKEN=tok;"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Secure"));
        assert!(!cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_insecure_cookies_when_configured() {
        let mut config = test_config();
        config.secure_cookies = false;
        let mut headers = HeaderMap::new();
        set_csrf_cookie(&config, &CsrfToken::new("tok"), &mut headers).unwrap();

        assert!(!set_cookie(&headers).contains("Secure"));
    }
}
