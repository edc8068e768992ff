use http::header::{COOKIE, HeaderMap, HeaderValue, SET_COOKIE};

use super::config::SESSION_COOKIE_NAME;
use super::errors::SessionError;
use crate::provider::SealedSession;

const COOKIE_ATTRIBUTES: &str = "Secure; HttpOnly; SameSite=Lax; Path=/";
const COOKIE_EXPIRED: &str = "Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT";

/// What a response must do with the session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieDirective {
    /// Store a freshly sealed session
    Set(SealedSession),
    /// Remove the cookie from the browser
    Clear,
}

impl CookieDirective {
    /// Value of the `Set-Cookie` header for this directive
    pub fn header_value(&self) -> String {
        let name = SESSION_COOKIE_NAME.as_str();
        match self {
            Self::Set(sealed) => format!("{name}={}; {COOKIE_ATTRIBUTES}", sealed.as_str()),
            Self::Clear => format!("{name}=; {COOKIE_ATTRIBUTES}; {COOKIE_EXPIRED}"),
        }
    }

    /// Append the `Set-Cookie` header to `headers`
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<(), SessionError> {
        let value = HeaderValue::from_str(&self.header_value())
            .map_err(|_| SessionError::Cookie("Failed to build Set-Cookie header".to_string()))?;
        headers.append(SET_COOKIE, value);
        Ok(())
    }
}

/// Find the session cookie among the request's `Cookie` headers
///
/// The first non-empty value wins. Empty values are skipped, and a request
/// carrying only empty ones has no session cookie.
pub fn session_cookie_from_headers(
    headers: &HeaderMap,
) -> Result<Option<SealedSession>, SessionError> {
    let cookie_name = SESSION_COOKIE_NAME.as_str();

    for cookie_header in headers.get_all(COOKIE) {
        let cookie_str = cookie_header.to_str().map_err(|e| {
            tracing::error!("Invalid cookie header: {}", e);
            SessionError::Cookie("Invalid cookie header".to_string())
        })?;

        let value = cookie_str.split(';').map(|s| s.trim()).find_map(|s| {
            let mut parts = s.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(k), Some(v)) if k == cookie_name && !v.is_empty() => Some(v),
                _ => None,
            }
        });

        if let Some(v) = value {
            return Ok(Some(SealedSession::new(v)));
        }
    }

    tracing::debug!("No non-empty session cookie '{}' found", cookie_name);
    Ok(None)
}
