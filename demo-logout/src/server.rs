use axum::Router;
use std::net::SocketAddr;
use tokio::task::JoinHandle;

use session_csrf_axum::SessionConfig;

const DEFAULT_PORT: u16 = 3001;

pub(crate) fn port_from_env() -> u16 {
    match std::env::var("PORT") {
        Ok(port) => port.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid PORT {:?}, using {}", port, DEFAULT_PORT);
            DEFAULT_PORT
        }),
        Err(_) => DEFAULT_PORT,
    }
}

/// Adjusts the cookie settings to the plain HTTP listener below.
///
/// Unless `SESSION_COOKIE_SECURE` was set explicitly, cookies are issued
/// without `Secure`. Browsers reject `__Host-` cookies that lack `Secure`, so
/// the prefix is dropped in that case.
pub(crate) fn plain_http_config(mut config: SessionConfig, secure_configured: bool) -> SessionConfig {
    if !secure_configured {
        config.secure_cookies = false;
    }
    if !config.secure_cookies {
        if let Some(name) = config
            .session_cookie_name
            .strip_prefix("__Host-")
            .map(str::to_string)
        {
            tracing::warn!(
                "Serving plain HTTP, using session cookie name {} instead of {}",
                name,
                config.session_cookie_name
            );
            config.session_cookie_name = name;
        }
    }
    config
}

pub(crate) fn spawn_http_server(port: u16, app: Router) -> JoinHandle<()> {
    tokio::spawn(async move {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        tracing::info!("HTTP server listening on {}", addr);
        if let Err(e) = axum_server::bind(addr)
            .serve(app.into_make_service())
            .await
        {
            tracing::error!("HTTP server error: {}", e);
        }
    })
}
