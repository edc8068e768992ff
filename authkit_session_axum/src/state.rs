use std::sync::Arc;

use authkit_session::{AuthKitConfig, IdentityProvider};

/// Shared by every handler and the session middleware
#[derive(Clone)]
pub struct AuthState {
    pub provider: Arc<dyn IdentityProvider>,
    pub config: Arc<AuthKitConfig>,
}

impl AuthState {
    pub fn new(provider: impl IdentityProvider, config: AuthKitConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            config: Arc::new(config),
        }
    }
}
