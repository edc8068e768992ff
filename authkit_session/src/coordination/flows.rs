use http::HeaderMap;
use serde::Deserialize;

use super::errors::CoordinationError;
use crate::config::AuthKitConfig;
use crate::provider::{
    AUTHKIT_PROVIDER, AuthorizationUrlRequest, CodeExchangeOptions, IdentityProvider,
    SealedSession, UserIdentity,
};
use crate::session::{CookieDirective, SessionError};

/// Query parameters the provider appends to the redirect URI
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set instead of `code` when the user aborted or the provider refused
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// URL of the hosted login page
pub fn login_core(
    provider: &dyn IdentityProvider,
    config: &AuthKitConfig,
    state: Option<String>,
) -> Result<String, CoordinationError> {
    let url = provider.authorization_url(&AuthorizationUrlRequest {
        provider: AUTHKIT_PROVIDER.to_string(),
        redirect_uri: config.redirect_uri.clone(),
        state,
    })?;
    tracing::debug!("Redirecting to hosted login: {}", url);
    Ok(url)
}

/// Exchange the callback's authorization code for a session cookie
///
/// Returns the headers setting the new cookie and the signed-in user. On any
/// failure no cookie header is produced.
#[tracing::instrument(skip_all)]
pub async fn callback_core(
    provider: &dyn IdentityProvider,
    config: &AuthKitConfig,
    params: &CallbackParams,
) -> Result<(HeaderMap, UserIdentity), CoordinationError> {
    if let Some(error) = params.error.as_deref() {
        return Err(CoordinationError::SessionError(SessionError::CodeExchangeFailure(
            format!(
                "{}: {}",
                error,
                params.error_description.as_deref().unwrap_or_default()
            ),
        ))
        .log());
    }

    let Some(code) = params.code.as_deref().filter(|code| !code.is_empty()) else {
        return Err(CoordinationError::SessionError(SessionError::CodeExchangeFailure(
            "Missing authorization code".to_string(),
        ))
        .log());
    };

    let options = CodeExchangeOptions {
        seal_session: true,
        cookie_password: config.cookie_password.clone(),
    };
    let exchange = provider
        .authenticate_with_code(code, &options)
        .await
        .map_err(|e| SessionError::CodeExchangeFailure(e.to_string()))?;

    let sealed = exchange.sealed_session.ok_or_else(|| {
        SessionError::CodeExchangeFailure("Provider returned no sealed session".to_string())
    })?;

    let mut headers = HeaderMap::new();
    CookieDirective::Set(sealed).apply(&mut headers)?;

    tracing::debug!("User {} signed in", exchange.user.id);
    Ok((headers, exchange.user))
}

/// End the session locally and find where to end it at the provider
///
/// The returned headers always clear the cookie. The URL is `None` when the
/// provider's logout URL could not be obtained.
#[tracing::instrument(skip_all, fields(has_cookie = cookie.is_some()))]
pub async fn logout_core(
    provider: &dyn IdentityProvider,
    config: &AuthKitConfig,
    cookie: Option<&SealedSession>,
) -> Result<(HeaderMap, Option<String>), CoordinationError> {
    let mut headers = HeaderMap::new();
    CookieDirective::Clear.apply(&mut headers)?;

    let Some(sealed) = cookie else {
        tracing::debug!("Logout without a session cookie");
        return Ok((headers, None));
    };

    let handle = provider.load_sealed_session(sealed, &config.cookie_password);
    match handle.get_logout_url().await {
        Ok(url) => Ok((headers, Some(url))),
        Err(e) => {
            tracing::warn!("Could not obtain provider logout URL: {}", e);
            Ok((headers, None))
        }
    }
}
