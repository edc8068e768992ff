//! Refresh state machine guarding protected routes
//!
//! ```text
//! NoCookie ───────────────────────────────────────────► redirect to login
//! cookie ─► Authenticated ────────────────────────────► run the handler
//!        └► NeedsRefresh ─► refresh() ─► RefreshSucceeded ► set cookie, retry original URL
//!                                     ├► RefreshFailed (rejected) ► redirect to login
//!                                     └► RefreshFailed (error) ► clear cookie, redirect to login
//! ```
//!
//! At most one refresh is attempted per request.

use super::cookie::CookieDirective;
use super::errors::SessionError;
use super::evaluator::evaluate_handle;
use crate::provider::{AuthResult, AuthenticatedSession, IdentityProvider, RefreshResult, SealedSession};

/// State in which a request's gate evaluation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    NoCookie,
    Authenticated,
    NeedsRefresh,
    RefreshSucceeded,
    RefreshFailed,
    Unauthenticated,
}

/// State of a plain evaluation, where no refresh is attempted
impl From<&AuthResult> for GateState {
    fn from(result: &AuthResult) -> Self {
        match result {
            AuthResult::Authenticated(_) => Self::Authenticated,
            AuthResult::Unauthenticated(reason) if reason.is_missing_cookie() => Self::NoCookie,
            AuthResult::Unauthenticated(_) => Self::Unauthenticated,
        }
    }
}

/// What the protected route must do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateAction {
    /// Run the wrapped handler
    Proceed(AuthenticatedSession),
    /// Redirect to the login page, optionally clearing the cookie
    RedirectToLogin { clear_cookie: bool },
    /// Store the new session and send the browser back to `location`
    RetryWithCookie {
        location: String,
        sealed_session: SealedSession,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    pub state: GateState,
    pub action: GateAction,
    /// Why the request was not let through, when it was not
    pub error: Option<SessionError>,
}

impl GateDecision {
    fn proceed(session: AuthenticatedSession) -> Self {
        Self {
            state: GateState::Authenticated,
            action: GateAction::Proceed(session),
            error: None,
        }
    }

    fn to_login(state: GateState, error: SessionError) -> Self {
        Self {
            state,
            action: GateAction::RedirectToLogin {
                clear_cookie: error.clears_cookie(),
            },
            error: Some(error),
        }
    }

    /// Cookie change the response must carry, if any
    pub fn cookie_directive(&self) -> Option<CookieDirective> {
        match &self.action {
            GateAction::Proceed(_) => None,
            GateAction::RedirectToLogin { clear_cookie: true } => Some(CookieDirective::Clear),
            GateAction::RedirectToLogin { clear_cookie: false } => None,
            GateAction::RetryWithCookie { sealed_session, .. } => {
                Some(CookieDirective::Set(sealed_session.clone()))
            }
        }
    }
}

/// Run the refresh state machine for one request to a protected route
///
/// `original_uri` is the path and query of the request, used as the retry
/// target after a successful refresh (see [`retry_location`]).
#[tracing::instrument(skip(provider, cookie_password, cookie), fields(has_cookie = cookie.is_some()))]
pub async fn gate_request(
    provider: &dyn IdentityProvider,
    cookie_password: &str,
    cookie: Option<&SealedSession>,
    original_uri: &str,
) -> GateDecision {
    let Some(sealed) = cookie else {
        tracing::debug!("Gate: {:?}", GateState::NoCookie);
        return GateDecision::to_login(GateState::NoCookie, SessionError::NoSession);
    };

    let handle = provider.load_sealed_session(sealed, cookie_password);

    let reason = match evaluate_handle(handle.as_ref()).await {
        AuthResult::Authenticated(session) => {
            tracing::debug!("Gate: {:?}", GateState::Authenticated);
            return GateDecision::proceed(session);
        }
        AuthResult::Unauthenticated(reason) => reason,
    };

    tracing::debug!("Gate: {:?} ({})", GateState::NeedsRefresh, reason);

    match handle.refresh().await {
        Ok(RefreshResult::Refreshed {
            sealed_session,
            user,
        }) => {
            let location = retry_location(original_uri);
            tracing::debug!(
                "Gate: {:?} for user {}, retrying {}",
                GateState::RefreshSucceeded,
                user.id,
                location
            );
            GateDecision {
                state: GateState::RefreshSucceeded,
                action: GateAction::RetryWithCookie {
                    location,
                    sealed_session,
                },
                error: None,
            }
        }
        Ok(RefreshResult::Rejected(refresh_reason)) => {
            tracing::debug!(
                "Gate: {:?}, refresh rejected: {}",
                GateState::RefreshFailed,
                refresh_reason
            );
            GateDecision::to_login(
                GateState::RefreshFailed,
                SessionError::InvalidOrExpiredSession(refresh_reason),
            )
        }
        Err(e) => {
            tracing::error!("Gate: {:?}, refresh error: {}", GateState::RefreshFailed, e);
            GateDecision::to_login(
                GateState::RefreshFailed,
                SessionError::RefreshTransportFailure(e.to_string()),
            )
        }
    }
}

/// Same-site path to send the browser back to after a refresh
///
/// Leading slashes collapse into one, so `//host/path` stays on this site
/// instead of becoming a protocol-relative URL. Values that are not absolute
/// paths, or that contain a backslash, fall back to `/`.
pub fn retry_location(original_uri: &str) -> String {
    if !original_uri.starts_with('/') || original_uri.contains('\\') {
        tracing::debug!("Unsafe retry target {:?}, using /", original_uri);
        return "/".to_string();
    }
    format!("/{}", original_uri.trim_start_matches('/'))
}
