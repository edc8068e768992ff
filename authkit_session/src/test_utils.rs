//! In-memory identity provider for tests
//!
//! Sealed values are plain strings registered up front, e.g. `"S1"` as a
//! valid session or `"expired"` as one that needs a refresh.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

use crate::config::AuthKitConfig;
use crate::provider::{
    AuthResult, AuthenticatedSession, AuthorizationUrlRequest, CodeExchange, CodeExchangeOptions,
    FailureReason, IdentityProvider, ProviderError, RefreshResult, SealedSession, SessionHandle,
    UserIdentity,
};

pub const MOCK_COOKIE_PASSWORD: &str = "test-cookie-password-0123456789abcdef";
pub const MOCK_LOGIN_BASE: &str = "https://auth.example.com";

pub fn mock_user() -> UserIdentity {
    UserIdentity {
        id: "user_01TEST".to_string(),
        email: "ada@example.com".to_string(),
        first_name: Some("Ada".to_string()),
        last_name: Some("Lovelace".to_string()),
        email_verified: true,
        profile_picture_url: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn mock_config() -> AuthKitConfig {
    AuthKitConfig {
        api_key: "sk_test_mock".to_string(),
        client_id: "client_mock".to_string(),
        cookie_password: MOCK_COOKIE_PASSWORD.to_string(),
        redirect_uri: "http://localhost:3000/callback".to_string(),
        api_base_url: MOCK_LOGIN_BASE.to_string(),
    }
}

/// How a refresh of a non-authenticating session behaves
#[derive(Debug, Clone)]
pub enum MockRefresh {
    /// The provider issues this new sealed value, which then authenticates
    Succeeds(String),
    /// The provider answers but refuses
    Rejected(FailureReason),
    /// The provider cannot be reached
    TransportError,
}

#[derive(Debug, Clone)]
enum MockSession {
    Valid(UserIdentity),
    Invalid {
        reason: FailureReason,
        refresh: MockRefresh,
    },
}

#[derive(Default)]
struct MockState {
    sessions: HashMap<String, MockSession>,
    codes: HashMap<String, Result<(String, UserIdentity), ProviderError>>,
}

#[derive(Default)]
struct MockInner {
    state: Mutex<MockState>,
    refresh_calls: AtomicUsize,
    logout_url_fails: AtomicBool,
}

impl MockInner {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Clone, Default)]
pub struct MockProvider {
    inner: Arc<MockInner>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_valid_session(self, sealed: &str, user: UserIdentity) -> Self {
        self.inner
            .state()
            .sessions
            .insert(sealed.to_string(), MockSession::Valid(user));
        self
    }

    pub fn with_invalid_session(
        self,
        sealed: &str,
        reason: FailureReason,
        refresh: MockRefresh,
    ) -> Self {
        self.inner
            .state()
            .sessions
            .insert(sealed.to_string(), MockSession::Invalid { reason, refresh });
        self
    }

    /// Accept `code` and answer with `sealed` for `user`
    pub fn with_code(self, code: &str, sealed: &str, user: UserIdentity) -> Self {
        self.inner
            .state()
            .codes
            .insert(code.to_string(), Ok((sealed.to_string(), user)));
        self
    }

    pub fn with_failing_code(self, code: &str, error: ProviderError) -> Self {
        self.inner
            .state()
            .codes
            .insert(code.to_string(), Err(error));
        self
    }

    pub fn with_failing_logout_url(self) -> Self {
        self.inner.logout_url_fails.store(true, Ordering::SeqCst);
        self
    }

    /// Number of refresh calls made through any handle
    pub fn refresh_calls(&self) -> usize {
        self.inner.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    fn load_sealed_session(
        &self,
        sealed: &SealedSession,
        cookie_password: &str,
    ) -> Box<dyn SessionHandle> {
        Box::new(MockHandle {
            inner: self.inner.clone(),
            sealed: sealed.as_str().to_string(),
            password_ok: cookie_password == MOCK_COOKIE_PASSWORD,
        })
    }

    fn authorization_url(
        &self,
        request: &AuthorizationUrlRequest,
    ) -> Result<String, ProviderError> {
        let mut url = Url::parse(MOCK_LOGIN_BASE)
            .and_then(|base| base.join("/user_management/authorize"))
            .map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("provider", &request.provider)
                .append_pair("redirect_uri", &request.redirect_uri);
            if let Some(state) = request.state.as_deref() {
                query.append_pair("state", state);
            }
        }
        Ok(url.to_string())
    }

    async fn authenticate_with_code(
        &self,
        code: &str,
        options: &CodeExchangeOptions,
    ) -> Result<CodeExchange, ProviderError> {
        let entry = self.inner.state().codes.get(code).cloned();
        match entry {
            Some(Ok((sealed, user))) => {
                // A successful exchange makes the new session valid
                self.inner
                    .state()
                    .sessions
                    .insert(sealed.clone(), MockSession::Valid(user.clone()));
                Ok(CodeExchange {
                    sealed_session: options.seal_session.then(|| SealedSession::new(sealed)),
                    user,
                })
            }
            Some(Err(e)) => Err(e),
            None => Err(ProviderError::Api {
                status: 400,
                code: "invalid_grant".to_string(),
                message: "The code is invalid or has expired.".to_string(),
            }),
        }
    }
}

struct MockHandle {
    inner: Arc<MockInner>,
    sealed: String,
    password_ok: bool,
}

impl MockHandle {
    fn session(&self) -> Option<MockSession> {
        if !self.password_ok {
            return None;
        }
        self.inner.state().sessions.get(&self.sealed).cloned()
    }
}

#[async_trait]
impl SessionHandle for MockHandle {
    async fn authenticate(&self) -> AuthResult {
        match self.session() {
            Some(MockSession::Valid(user)) => AuthResult::Authenticated(AuthenticatedSession {
                user,
                session_id: format!("session_{}", self.sealed),
                organization_id: None,
                role: Some("member".to_string()),
                permissions: vec![],
            }),
            Some(MockSession::Invalid { reason, .. }) => AuthResult::Unauthenticated(reason),
            None => AuthResult::Unauthenticated(FailureReason::InvalidSessionCookie),
        }
    }

    async fn refresh(&self) -> Result<RefreshResult, ProviderError> {
        self.inner.refresh_calls.fetch_add(1, Ordering::SeqCst);

        let refresh = match self.session() {
            Some(MockSession::Invalid { refresh, .. }) => refresh,
            Some(MockSession::Valid(_)) => MockRefresh::Succeeds(format!("{}-refreshed", self.sealed)),
            None => return Err(ProviderError::Seal("Failed to unseal session".to_string())),
        };

        match refresh {
            MockRefresh::Succeeds(next) => {
                let user = mock_user();
                self.inner
                    .state()
                    .sessions
                    .insert(next.clone(), MockSession::Valid(user.clone()));
                Ok(RefreshResult::Refreshed {
                    sealed_session: SealedSession::new(next),
                    user,
                })
            }
            MockRefresh::Rejected(reason) => Ok(RefreshResult::Rejected(reason)),
            MockRefresh::TransportError => {
                Err(ProviderError::Transport("connection refused".to_string()))
            }
        }
    }

    async fn get_logout_url(&self) -> Result<String, ProviderError> {
        if self.inner.logout_url_fails.load(Ordering::SeqCst) {
            return Err(ProviderError::Transport("connection refused".to_string()));
        }
        match self.authenticate().await {
            AuthResult::Authenticated(session) => Ok(format!(
                "{MOCK_LOGIN_BASE}/user_management/sessions/logout?session_id={}",
                session.session_id
            )),
            AuthResult::Unauthenticated(reason) => Err(ProviderError::NotAuthenticated(reason)),
        }
    }
}
