//! Error types for the login, callback and logout flows

use thiserror::Error;

use crate::provider::ProviderError;
use crate::session::SessionError;

/// Errors that end a login, callback or logout flow
#[derive(Error, Debug, Clone)]
pub enum CoordinationError {
    /// Error from session handling
    #[error("Session error: {0}")]
    SessionError(SessionError),

    /// Error from the identity provider
    #[error("Provider error: {0}")]
    ProviderError(ProviderError),
}

impl CoordinationError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::SessionError(err) => tracing::error!("Session error: {}", err),
            Self::ProviderError(err) => tracing::error!("Provider error: {}", err),
        }
        self
    }
}

// Custom From implementations that automatically log errors

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        let error = Self::SessionError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<ProviderError> for CoordinationError {
    fn from(err: ProviderError) -> Self {
        let error = Self::ProviderError(err);
        tracing::error!("{}", error);
        error
    }
}
