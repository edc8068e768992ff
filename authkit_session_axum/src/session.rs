use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    response::{IntoResponse, Response},
};
use http::{Method, StatusCode, request::Parts};

use authkit_session::{
    AuthResult, AuthenticatedSession, GateState, evaluate, session_cookie_from_headers,
};

use super::config::AUTHKIT_REDIRECT_ANON;
use super::redirect::found;
use super::state::AuthState;

pub struct AuthRedirect {
    method: Method,
}

impl AuthRedirect {
    fn new(method: Method) -> Self {
        Self { method }
    }

    fn into_response_with_method(self) -> Response {
        if self.method == Method::GET {
            tracing::debug!("Redirecting to {}", AUTHKIT_REDIRECT_ANON.as_str());
            found(AUTHKIT_REDIRECT_ANON.as_str())
        } else {
            tracing::debug!("Unauthorized");
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        self.into_response_with_method()
    }
}

/// Authenticated user, available as an Axum extractor
///
/// Behind [`require_session`](crate::require_session) the user placed in the
/// request by the middleware is reused. Elsewhere the session cookie is
/// evaluated on the spot, without attempting a refresh.
///
/// ```no_run
/// use axum::{routing::get, Router};
/// use authkit_session_axum::{AuthState, AuthUser};
///
/// async fn whoami(user: AuthUser) -> String {
///     format!("Hello, {}!", user.name)
/// }
///
/// fn app(state: AuthState) -> Router {
///     Router::new().route("/whoami", get(whoami)).with_state(state)
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    /// Provider user identifier
    pub id: String,
    pub email: String,
    /// Full name, or the email address when no name is known
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_verified: bool,
    pub profile_picture_url: Option<String>,
    /// Provider session identifier
    pub session_id: String,
    pub organization_id: Option<String>,
    pub role: Option<String>,
    pub permissions: Vec<String>,
}

impl From<AuthenticatedSession> for AuthUser {
    fn from(session: AuthenticatedSession) -> Self {
        let name = session.user.display_name();
        AuthUser {
            id: session.user.id,
            email: session.user.email,
            name,
            first_name: session.user.first_name,
            last_name: session.user.last_name,
            email_verified: session.user.email_verified,
            profile_picture_url: session.user.profile_picture_url,
            session_id: session.session_id,
            organization_id: session.organization_id,
            role: session.role,
            permissions: session.permissions,
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let method = parts.method.clone();
        let state = AuthState::from_ref(state);

        let cookie = session_cookie_from_headers(&parts.headers).map_err(|e| {
            tracing::error!("Failed to read session cookie: {}", e);
            AuthRedirect::new(method.clone())
        })?;

        let result = evaluate(
            state.provider.as_ref(),
            &state.config.cookie_password,
            cookie.as_ref(),
        )
        .await;
        tracing::debug!("Session state: {:?}", GateState::from(&result));

        match result {
            AuthResult::Authenticated(session) => Ok(AuthUser::from(session)),
            AuthResult::Unauthenticated(_) => Err(AuthRedirect::new(method)),
        }
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let result: Result<Self, Self::Rejection> =
            <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state).await;
        Ok(result.ok())
    }
}
