use thiserror::Error;

use crate::provider::FailureReason;

/// Outcomes of session handling that end the request with a login redirect
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No cookie was sent. A normal anonymous request, not a fault.
    #[error("No session cookie")]
    NoSession,

    /// A cookie was sent but the provider did not accept it
    #[error("Invalid or expired session: {0}")]
    InvalidOrExpiredSession(FailureReason),

    /// The single refresh attempt could not reach the provider or open the cookie
    #[error("Session refresh failed: {0}")]
    RefreshTransportFailure(String),

    /// The authorization code was missing, rejected or could not be exchanged
    #[error("Code exchange failed: {0}")]
    CodeExchangeFailure(String),

    #[error("Cookie error: {0}")]
    Cookie(String),
}

impl SessionError {
    /// Whether the stale cookie should be removed from the browser
    pub fn clears_cookie(&self) -> bool {
        matches!(self, Self::RefreshTransportFailure(_))
    }
}
