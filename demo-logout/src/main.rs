use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use session_csrf_axum::{SessionConfig, SessionStore, protect, session_csrf_router};

mod handlers;
mod server;

use crate::{
    handlers::{dev_login, index, protected},
    server::{plain_http_config, port_from_env, spawn_http_server},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=debug,session_csrf=debug,session_csrf_axum=debug,tower_http=info",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let secure_configured = std::env::var("SESSION_COOKIE_SECURE").is_ok();
    let config = plain_http_config(SessionConfig::default(), secure_configured);
    let store = SessionStore::from_config(config).await?;

    let app = Router::new()
        .route("/", get(index))
        .route("/protected", get(protected))
        .route("/dev/login", get(dev_login))
        .with_state(store.clone())
        .merge(session_csrf_router(store.clone()));

    // Last, so the filter covers every route above
    let app = protect(app, store);

    spawn_http_server(port_from_env(), app).await?;
    Ok(())
}
