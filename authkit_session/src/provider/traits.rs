use async_trait::async_trait;

use super::errors::ProviderError;
use super::types::{
    AuthResult, AuthorizationUrlRequest, CodeExchange, CodeExchangeOptions, RefreshResult,
    SealedSession,
};

/// A sealed session loaded into the provider's codec
///
/// Obtained from [`IdentityProvider::load_sealed_session`]. Each handle is
/// scoped to a single request.
#[async_trait]
pub trait SessionHandle: Send + Sync {
    /// Verify the session. Never fails; problems are reported as a reason.
    async fn authenticate(&self) -> AuthResult;

    /// Exchange the session for a fresh one.
    ///
    /// `Ok(RefreshResult::Rejected(_))` means the provider answered and said no.
    /// `Err(_)` means the provider could not be asked (transport or codec failure).
    async fn refresh(&self) -> Result<RefreshResult, ProviderError>;

    /// Provider URL that ends this session on the provider side
    async fn get_logout_url(&self) -> Result<String, ProviderError>;
}

/// Capability surface of the hosted identity provider
///
/// Implemented by [`WorkosClient`](super::WorkosClient) for the real API and by
/// `MockProvider` in tests. Shared across requests behind an `Arc`.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    fn load_sealed_session(
        &self,
        sealed: &SealedSession,
        cookie_password: &str,
    ) -> Box<dyn SessionHandle>;

    /// URL of the hosted login page
    fn authorization_url(&self, request: &AuthorizationUrlRequest)
    -> Result<String, ProviderError>;

    /// Exchange a one-time authorization code for a session
    async fn authenticate_with_code(
        &self,
        code: &str,
        options: &CodeExchangeOptions,
    ) -> Result<CodeExchange, ProviderError>;
}
