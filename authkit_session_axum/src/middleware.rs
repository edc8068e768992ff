use axum::{
    extract::{OriginalUri, Request, State},
    middleware::Next,
    response::Response,
};
use http::HeaderMap;

use authkit_session::{GateAction, gate_request, session_cookie_from_headers};

use super::config::AUTHKIT_REDIRECT_ANON;
use super::redirect::found_with_headers;
use super::session::AuthUser;
use super::state::AuthState;

/// Protect routes behind a valid session, refreshing it once if needed
///
/// Use with `axum::middleware::from_fn_with_state`. An authenticated request
/// reaches the handler with [`AuthUser`] in its extensions. A refreshed
/// session is stored and the browser is sent back to the same URL. Anything
/// else ends with a redirect to the login page.
///
/// ```no_run
/// use axum::{Router, middleware::from_fn_with_state, routing::get};
/// use authkit_session_axum::{AuthState, AuthUser, require_session};
///
/// async fn account(user: AuthUser) -> String {
///     user.email
/// }
///
/// fn app(state: AuthState) -> Router {
///     Router::new()
///         .route("/account", get(account))
///         .route_layer(from_fn_with_state(state.clone(), require_session))
///         .with_state(state)
/// }
/// ```
pub async fn require_session(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie = session_cookie_from_headers(req.headers()).unwrap_or_else(|e| {
        tracing::error!("Ignoring unreadable session cookie: {}", e);
        None
    });

    // Nested routers see a stripped path, the browser needs the full one
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map(|original| original.0.clone())
        .unwrap_or_else(|| req.uri().clone());
    let location = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    let decision = gate_request(
        state.provider.as_ref(),
        &state.config.cookie_password,
        cookie.as_ref(),
        &location,
    )
    .await;

    let mut headers = HeaderMap::new();
    if let Some(directive) = decision.cookie_directive() {
        if let Err(e) = directive.apply(&mut headers) {
            tracing::error!("Failed to set session cookie: {}", e);
            return found_with_headers(HeaderMap::new(), AUTHKIT_REDIRECT_ANON.as_str());
        }
    }

    match decision.action {
        GateAction::Proceed(session) => {
            req.extensions_mut().insert(AuthUser::from(session));
            next.run(req).await
        }
        GateAction::RetryWithCookie { location, .. } => found_with_headers(headers, &location),
        GateAction::RedirectToLogin { .. } => {
            if let Some(error) = decision.error.as_ref() {
                tracing::debug!("Redirecting to login: {}", error);
            }
            found_with_headers(headers, AUTHKIT_REDIRECT_ANON.as_str())
        }
    }
}
