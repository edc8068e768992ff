use thiserror::Error;

use super::types::FailureReason;
use crate::utils::UtilError;

/// Errors raised at the identity provider boundary
#[derive(Debug, Error, Clone)]
pub enum ProviderError {
    /// The provider could not be reached or did not answer properly
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with an error status
    #[error("Provider API error ({status}): {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Seal error: {0}")]
    Seal(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Serde error: {0}")]
    Serde(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The operation needs an authenticated session
    #[error("Session is not authenticated: {0}")]
    NotAuthenticated(FailureReason),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl ProviderError {
    /// Client-side rejections, as opposed to outages
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Api { status, .. } if (400..500).contains(status))
    }
}
