use std::sync::LazyLock;

pub(crate) const SESSION_COOKIE_NAME_DEFAULT: &str = "wos_session";

/// Name of the cookie carrying the sealed session
pub static SESSION_COOKIE_NAME: LazyLock<String> =
    LazyLock::new(|| cookie_name_or_default(std::env::var("SESSION_COOKIE_NAME").ok()));

fn cookie_name_or_default(value: Option<String>) -> String {
    value
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or(SESSION_COOKIE_NAME_DEFAULT.to_string())
}
