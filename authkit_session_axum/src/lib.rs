//! authkit-session-axum - Axum integration for authkit-session
//!
//! Provides the `/login`, `/callback` and `/logout` routes, the
//! [`require_session`] middleware for protected routes and the [`AuthUser`]
//! extractor.

mod auth;
mod config;
mod error;
mod middleware;
mod redirect;
mod router;
mod session;
mod state;

pub use config::{AUTHKIT_LOGOUT_FALLBACK, AUTHKIT_REDIRECT_ANON, AUTHKIT_REDIRECT_USER};
pub use middleware::require_session;
pub use router::{authkit_router, authkit_router_no_trace};
pub use session::{AuthRedirect, AuthUser};
pub use state::AuthState;

pub use authkit_session::{AuthKitConfig, ConfigError, SESSION_COOKIE_NAME, WorkosClient};
