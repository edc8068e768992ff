use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use url::Url;

use super::jwks::{JwksCache, TokenVerificationError};
use super::seal::{seal_data, unseal_data};
use super::types::{ApiErrorBody, AuthenticateRequest, AuthenticationResponse, SessionCookieData};
use crate::config::AuthKitConfig;
use crate::provider::errors::ProviderError;
use crate::provider::traits::{IdentityProvider, SessionHandle};
use crate::provider::types::{
    AuthResult, AuthenticatedSession, AuthorizationUrlRequest, CodeExchange, CodeExchangeOptions,
    FailureReason, RefreshResult, SealedSession,
};
use crate::utils::get_client;

/// HTTP adapter for the WorkOS user management API
///
/// Cheap to clone; clones share the HTTP connection pool and the JWKs cache.
#[derive(Clone)]
pub struct WorkosClient {
    inner: Arc<WorkosInner>,
}

struct WorkosInner {
    api_key: String,
    client_id: String,
    base_url: Url,
    http: reqwest::Client,
    jwks: JwksCache,
}

impl fmt::Debug for WorkosClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkosClient")
            .field("client_id", &self.inner.client_id)
            .field("base_url", &self.inner.base_url.as_str())
            .finish()
    }
}

fn endpoint(base_url: &Url, segments: &[&str]) -> Result<Url, ProviderError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| ProviderError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

impl WorkosClient {
    pub fn new(config: &AuthKitConfig) -> Result<Self, ProviderError> {
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| ProviderError::InvalidUrl(format!("{}: {e}", config.api_base_url)))?;
        let http = get_client()?;
        let jwks_url = endpoint(&base_url, &["sso", "jwks", &config.client_id])?;

        Ok(Self {
            inner: Arc::new(WorkosInner {
                api_key: config.api_key.clone(),
                client_id: config.client_id.clone(),
                jwks: JwksCache::new(jwks_url.to_string(), http.clone()),
                base_url,
                http,
            }),
        })
    }

    fn logout_url(&self, session_id: &str) -> Result<String, ProviderError> {
        let mut url = endpoint(
            &self.inner.base_url,
            &["user_management", "sessions", "logout"],
        )?;
        url.query_pairs_mut().append_pair("session_id", session_id);
        Ok(url.to_string())
    }

    async fn post_authenticate(
        &self,
        request: &AuthenticateRequest<'_>,
    ) -> Result<AuthenticationResponse, ProviderError> {
        let url = endpoint(&self.inner.base_url, &["user_management", "authenticate"])?;
        let response = self
            .inner
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            let body: ApiErrorBody = serde_json::from_str(&response_body).unwrap_or_default();
            tracing::debug!("Authenticate call failed with {}: {}", status, body.code());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                code: body.code(),
                message: body.message(),
            });
        }

        serde_json::from_str(&response_body)
            .map_err(|e| ProviderError::Serde(format!("Failed to deserialize response body: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for WorkosClient {
    fn load_sealed_session(
        &self,
        sealed: &SealedSession,
        cookie_password: &str,
    ) -> Box<dyn SessionHandle> {
        Box::new(WorkosSession {
            client: self.clone(),
            sealed: sealed.clone(),
            cookie_password: cookie_password.to_string(),
        })
    }

    fn authorization_url(
        &self,
        request: &AuthorizationUrlRequest,
    ) -> Result<String, ProviderError> {
        let mut url = endpoint(&self.inner.base_url, &["user_management", "authorize"])?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.inner.client_id)
                .append_pair("redirect_uri", &request.redirect_uri)
                .append_pair("response_type", "code")
                .append_pair("provider", &request.provider);
            if let Some(state) = request.state.as_deref() {
                query.append_pair("state", state);
            }
        }
        Ok(url.to_string())
    }

    #[tracing::instrument(skip_all)]
    async fn authenticate_with_code(
        &self,
        code: &str,
        options: &CodeExchangeOptions,
    ) -> Result<CodeExchange, ProviderError> {
        let response = self
            .post_authenticate(&AuthenticateRequest::AuthorizationCode {
                client_id: &self.inner.client_id,
                client_secret: &self.inner.api_key,
                code,
            })
            .await?;
        tracing::debug!(
            "Code exchanged for user {} via {:?}",
            response.user.id,
            response.authentication_method
        );

        let user = response.user.clone();
        let sealed_session = if options.seal_session {
            Some(seal_data(
                &SessionCookieData::from(response),
                &options.cookie_password,
            )?)
        } else {
            None
        };

        Ok(CodeExchange {
            sealed_session,
            user,
        })
    }
}

/// A session cookie loaded for one request
struct WorkosSession {
    client: WorkosClient,
    sealed: SealedSession,
    cookie_password: String,
}

#[async_trait]
impl SessionHandle for WorkosSession {
    async fn authenticate(&self) -> AuthResult {
        let data: SessionCookieData = match unseal_data(&self.sealed, &self.cookie_password) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("Failed to unseal session cookie: {}", e);
                return AuthResult::Unauthenticated(FailureReason::InvalidSessionCookie);
            }
        };

        match self
            .client
            .inner
            .jwks
            .verify_access_token(&data.access_token)
            .await
        {
            Ok(claims) => AuthResult::Authenticated(AuthenticatedSession {
                user: data.user,
                session_id: claims.sid,
                organization_id: claims.org_id.or(data.organization_id),
                role: claims.role,
                permissions: claims.permissions,
            }),
            Err(e) => {
                tracing::debug!("Access token rejected: {}", e);
                AuthResult::Unauthenticated(e.failure_reason())
            }
        }
    }

    async fn refresh(&self) -> Result<RefreshResult, ProviderError> {
        let data: SessionCookieData = unseal_data(&self.sealed, &self.cookie_password)?;

        let result = self
            .client
            .post_authenticate(&AuthenticateRequest::RefreshToken {
                client_id: &self.client.inner.client_id,
                client_secret: &self.client.inner.api_key,
                refresh_token: &data.refresh_token,
                organization_id: data.organization_id.as_deref(),
            })
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) if e.is_rejection() => {
                tracing::debug!("Refresh rejected by provider: {}", e);
                let reason = match e {
                    ProviderError::Api { code, .. } => FailureReason::from(code.as_str()),
                    other => FailureReason::Other(other.to_string()),
                };
                return Ok(RefreshResult::Rejected(reason));
            }
            Err(e) => return Err(e),
        };

        // The retry must authenticate, otherwise the browser cycles through refresh
        if let Err(e) = self
            .client
            .inner
            .jwks
            .verify_access_token(&response.access_token)
            .await
        {
            tracing::error!("Refreshed access token failed verification: {}", e);
            return Err(match e {
                TokenVerificationError::JwksFetch(message) => ProviderError::Transport(message),
                other => ProviderError::Token(other.to_string()),
            });
        }

        let user = response.user.clone();
        let sealed_session = seal_data(&SessionCookieData::from(response), &self.cookie_password)?;
        Ok(RefreshResult::Refreshed {
            sealed_session,
            user,
        })
    }

    async fn get_logout_url(&self) -> Result<String, ProviderError> {
        match self.authenticate().await {
            AuthResult::Authenticated(session) => self.client.logout_url(&session.session_id),
            AuthResult::Unauthenticated(reason) => Err(ProviderError::NotAuthenticated(reason)),
        }
    }
}
