//! authkit-session - Sealed-session gate for apps using hosted login
//!
//! Login is delegated to a hosted identity provider. This crate keeps the
//! resulting session in an encrypted cookie, decides on every request whether
//! that cookie is still good, refreshes it once when it is not, and drives
//! the login, callback and logout flows.

mod config;
mod coordination;
mod provider;
mod session;
mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{AuthKitConfig, ConfigError};

pub use coordination::{CallbackParams, CoordinationError, callback_core, login_core, logout_core};

pub use provider::{
    AUTHKIT_PROVIDER, AuthResult, AuthenticatedSession, AuthorizationUrlRequest, CodeExchange,
    CodeExchangeOptions, FailureReason, IdentityProvider, ProviderError, RefreshResult,
    SealedSession, SessionHandle, UserIdentity, WorkosClient,
};

pub use session::{
    CookieDirective, GateAction, GateDecision, GateState, SESSION_COOKIE_NAME, SessionError,
    evaluate, evaluate_checked, gate_request, retry_location, session_cookie_from_headers,
};

pub use utils::UtilError;
