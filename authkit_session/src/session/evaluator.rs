use super::errors::SessionError;
use crate::provider::{
    AuthResult, AuthenticatedSession, FailureReason, IdentityProvider, SealedSession,
    SessionHandle,
};

/// Decide whether the request carrying `cookie` is authenticated
///
/// A missing cookie is reported as `no_session_cookie_provided` without
/// consulting the provider. No side effects: the cookie is never refreshed or
/// rewritten here.
#[tracing::instrument(skip_all, fields(has_cookie = cookie.is_some()))]
pub async fn evaluate(
    provider: &dyn IdentityProvider,
    cookie_password: &str,
    cookie: Option<&SealedSession>,
) -> AuthResult {
    let Some(sealed) = cookie else {
        tracing::debug!("No session cookie provided");
        return AuthResult::no_session();
    };

    let handle = provider.load_sealed_session(sealed, cookie_password);
    evaluate_handle(handle.as_ref()).await
}

/// Same as [`evaluate`], with failures as [`SessionError`]
pub async fn evaluate_checked(
    provider: &dyn IdentityProvider,
    cookie_password: &str,
    cookie: Option<&SealedSession>,
) -> Result<AuthenticatedSession, SessionError> {
    match evaluate(provider, cookie_password, cookie).await {
        AuthResult::Authenticated(session) => Ok(session),
        AuthResult::Unauthenticated(reason) if reason.is_missing_cookie() => {
            Err(SessionError::NoSession)
        }
        AuthResult::Unauthenticated(reason) => Err(SessionError::InvalidOrExpiredSession(reason)),
    }
}

/// Authenticate a handle whose cookie is known to be present
pub(super) async fn evaluate_handle(handle: &dyn SessionHandle) -> AuthResult {
    match handle.authenticate().await {
        AuthResult::Authenticated(session) => {
            tracing::debug!("Session authenticated for user {}", session.user.id);
            AuthResult::Authenticated(session)
        }
        // A cookie was sent, so "missing" would wrongly skip the refresh
        AuthResult::Unauthenticated(reason) if reason.is_missing_cookie() => {
            tracing::debug!("Provider reported a missing cookie for a present one");
            AuthResult::Unauthenticated(FailureReason::InvalidSessionCookie)
        }
        AuthResult::Unauthenticated(reason) => {
            tracing::debug!("Session not authenticated: {}", reason);
            AuthResult::Unauthenticated(reason)
        }
    }
}
