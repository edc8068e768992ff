//! Router for the login, callback and logout endpoints

use axum::Router;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::state::AuthState;

/// Create a router serving `/login`, `/callback` and `/logout`
///
/// Merge it into the application router at the root so that the paths match
/// the configured redirect URI.
pub fn authkit_router(state: AuthState) -> Router {
    authkit_router_no_trace(state).layer(
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

/// Same as [`authkit_router`] without the HTTP tracing middleware
pub fn authkit_router_no_trace(state: AuthState) -> Router {
    super::auth::router().with_state(state)
}
