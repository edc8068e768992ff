use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the hosted login experience
pub const AUTHKIT_PROVIDER: &str = "authkit";

/// Opaque encrypted session blob, as stored in the session cookie
///
/// The value is produced and consumed only by an [`IdentityProvider`](super::IdentityProvider).
/// Nothing in this crate looks inside it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SealedSession(String);

impl SealedSession {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SealedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SealedSession(<{} bytes>)", self.0.len())
    }
}

impl From<String> for SealedSession {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SealedSession {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Authenticated principal as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserIdentity {
    /// First and last name when known, the email address otherwise
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

/// Why a session did not authenticate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// No cookie was sent at all. Not retryable through a refresh.
    NoSessionCookieProvided,
    /// The blob could not be unsealed or is structurally wrong
    InvalidSessionCookie,
    /// The access token inside the session failed verification
    InvalidJwt,
    /// The access token inside the session is past its expiry
    Expired,
    /// The provider could not be reached to verify the session
    ProviderUnavailable,
    /// Any other reason reported by the provider
    Other(String),
}

impl FailureReason {
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoSessionCookieProvided => "no_session_cookie_provided",
            Self::InvalidSessionCookie => "invalid_session_cookie",
            Self::InvalidJwt => "invalid_jwt",
            Self::Expired => "expired",
            Self::ProviderUnavailable => "provider_unavailable",
            Self::Other(reason) => reason.as_str(),
        }
    }

    /// Only a missing cookie short-circuits the refresh attempt
    pub fn is_missing_cookie(&self) -> bool {
        matches!(self, Self::NoSessionCookieProvided)
    }
}

impl From<&str> for FailureReason {
    fn from(value: &str) -> Self {
        match value {
            "no_session_cookie_provided" => Self::NoSessionCookieProvided,
            "invalid_session_cookie" => Self::InvalidSessionCookie,
            "invalid_jwt" => Self::InvalidJwt,
            "expired" => Self::Expired,
            "provider_unavailable" => Self::ProviderUnavailable,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verified session, passed through to rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub user: UserIdentity,
    /// Provider-side session identifier (the `sid` claim)
    pub session_id: String,
    pub organization_id: Option<String>,
    pub role: Option<String>,
    pub permissions: Vec<String>,
}

/// Outcome of authenticating a sealed session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    Authenticated(AuthenticatedSession),
    Unauthenticated(FailureReason),
}

impl AuthResult {
    pub fn no_session() -> Self {
        Self::Unauthenticated(FailureReason::NoSessionCookieProvided)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            Self::Authenticated(session) => Some(&session.user),
            Self::Unauthenticated(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&FailureReason> {
        match self {
            Self::Authenticated(_) => None,
            Self::Unauthenticated(reason) => Some(reason),
        }
    }
}

/// Outcome of a refresh call that reached the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshResult {
    Refreshed {
        sealed_session: SealedSession,
        user: UserIdentity,
    },
    Rejected(FailureReason),
}

impl RefreshResult {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Refreshed { .. })
    }
}

/// Options for exchanging an authorization code
#[derive(Clone)]
pub struct CodeExchangeOptions {
    /// Ask the provider adapter to seal the resulting session
    pub seal_session: bool,
    pub cookie_password: String,
}

impl fmt::Debug for CodeExchangeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeExchangeOptions")
            .field("seal_session", &self.seal_session)
            .field("cookie_password", &"<redacted>")
            .finish()
    }
}

/// Successful authorization code exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeExchange {
    /// Present when sealing was requested
    pub sealed_session: Option<SealedSession>,
    pub user: UserIdentity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationUrlRequest {
    pub provider: String,
    pub redirect_uri: String,
    pub state: Option<String>,
}
