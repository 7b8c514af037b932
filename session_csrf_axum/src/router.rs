//! Router for the session endpoints

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use session_csrf::SessionStore;

/// Create a router for the session endpoints
///
/// - `POST /logout`
/// - `GET /user`
///
/// The returned router still needs [`crate::protect`]; apply it to the
/// application router after merging this one in, so the CSRF filter covers
/// every route.
pub fn session_csrf_router(store: SessionStore) -> Router {
    session_csrf_router_no_trace(store).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as `session_csrf_router()` but without the HTTP tracing middleware.
pub fn session_csrf_router_no_trace(store: SessionStore) -> Router {
    Router::new()
        .route("/logout", post(super::handlers::logout))
        .route("/user", get(super::handlers::user_status))
        .with_state(store)
}
