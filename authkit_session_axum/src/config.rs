//! Redirect targets used by the axum integration

use std::sync::LazyLock;

/// Where anonymous visitors and every failed auth flow are sent
/// Default: "/login"
pub static AUTHKIT_REDIRECT_ANON: LazyLock<String> = LazyLock::new(|| {
    redirect_or_default(std::env::var("AUTHKIT_REDIRECT_ANON").ok(), "/login")
});

/// Landing page after a successful login
/// Default: "/"
pub static AUTHKIT_REDIRECT_USER: LazyLock<String> =
    LazyLock::new(|| redirect_or_default(std::env::var("AUTHKIT_REDIRECT_USER").ok(), "/"));

/// Used after logout when the provider's logout URL is unavailable
/// Default: "/"
pub static AUTHKIT_LOGOUT_FALLBACK: LazyLock<String> =
    LazyLock::new(|| redirect_or_default(std::env::var("AUTHKIT_LOGOUT_FALLBACK").ok(), "/"));

/// Configured path, or `default` when unset or blank
fn redirect_or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
