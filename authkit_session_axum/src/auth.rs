use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
    routing::get,
};
use http::{HeaderMap, StatusCode};
use serde::Deserialize;

use authkit_session::{
    CallbackParams, CookieDirective, callback_core, login_core, logout_core,
    session_cookie_from_headers,
};

use super::config::{AUTHKIT_LOGOUT_FALLBACK, AUTHKIT_REDIRECT_USER};
use super::error::IntoResponseError;
use super::redirect::{found, found_with_headers};
use super::state::AuthState;

pub(super) fn router() -> Router<AuthState> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", get(logout))
}

#[derive(Debug, Default, Deserialize)]
struct LoginParams {
    /// Opaque value handed back on the callback
    state: Option<String>,
}

async fn login(State(state): State<AuthState>, Query(params): Query<LoginParams>) -> Response {
    match login_core(state.provider.as_ref(), &state.config, params.state) {
        Ok(url) => found(&url),
        // Redirecting to /login here would loop
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Login is unavailable").into_response(),
    }
}

async fn callback(
    State(state): State<AuthState>,
    query: Result<Query<CallbackParams>, QueryRejection>,
) -> Result<Response, Response> {
    // Malformed parameters end like a missing code
    let params = query.map(|Query(params)| params).unwrap_or_else(|e| {
        tracing::debug!("Unreadable callback parameters: {}", e);
        CallbackParams::default()
    });

    let (headers, user) = callback_core(state.provider.as_ref(), &state.config, &params)
        .await
        .into_response_error()?;

    tracing::info!("User {} logged in", user.id);
    Ok(found_with_headers(headers, AUTHKIT_REDIRECT_USER.as_str()))
}

async fn logout(State(state): State<AuthState>, headers: HeaderMap) -> Response {
    let cookie = session_cookie_from_headers(&headers).unwrap_or_else(|e| {
        tracing::error!("Ignoring unreadable session cookie: {}", e);
        None
    });

    match logout_core(state.provider.as_ref(), &state.config, cookie.as_ref()).await {
        Ok((headers, Some(url))) => found_with_headers(headers, &url),
        Ok((headers, None)) => found_with_headers(headers, AUTHKIT_LOGOUT_FALLBACK.as_str()),
        Err(e) => {
            tracing::error!("Logout failed: {}", e);
            let mut headers = HeaderMap::new();
            if let Err(e) = CookieDirective::Clear.apply(&mut headers) {
                tracing::error!("Failed to clear session cookie: {}", e);
            }
            found_with_headers(headers, AUTHKIT_LOGOUT_FALLBACK.as_str())
        }
    }
}
