//! Process-wide credentials for the identity provider
//!
//! Loaded once at startup. Every required variable must be present, otherwise
//! the process should refuse to start rather than fail individual requests.

use std::fmt;
use thiserror::Error;
use url::Url;

pub(crate) const WORKOS_API_BASE_URL_DEFAULT: &str = "https://api.workos.com";

/// The sealing key is derived from this secret, short passwords are rejected
pub(crate) const MIN_COOKIE_PASSWORD_LEN: usize = 32;

const ENV_API_KEY: &str = "WORKOS_API_KEY";
const ENV_CLIENT_ID: &str = "WORKOS_CLIENT_ID";
const ENV_COOKIE_PASSWORD: &str = "WORKOS_COOKIE_PASSWORD";
const ENV_REDIRECT_URI: &str = "WORKOS_REDIRECT_URI";
const ENV_API_BASE_URL: &str = "WORKOS_API_BASE_URL";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Read-only configuration shared by every request
#[derive(Clone)]
pub struct AuthKitConfig {
    /// API key, also sent as `client_secret` on token requests
    pub api_key: String,
    /// Client identifier issued by the provider
    pub client_id: String,
    /// Secret used to seal and unseal the session cookie
    pub cookie_password: String,
    /// Where the provider sends the browser back with `?code=...`
    pub redirect_uri: String,
    /// Provider API root, overridable for testing
    pub api_base_url: String,
}

impl fmt::Debug for AuthKitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthKitConfig")
            .field("api_key", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("cookie_password", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl AuthKitConfig {
    /// Load the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| -> Result<String, ConfigError> {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let api_key = required(ENV_API_KEY)?;
        let client_id = required(ENV_CLIENT_ID)?;
        let cookie_password = required(ENV_COOKIE_PASSWORD)?;
        let redirect_uri = required(ENV_REDIRECT_URI)?;
        let api_base_url = lookup(ENV_API_BASE_URL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| WORKOS_API_BASE_URL_DEFAULT.to_string());

        let config = Self {
            api_key,
            client_id,
            cookie_password,
            redirect_uri,
            api_base_url,
        };
        config.validate()?;

        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cookie_password.len() < MIN_COOKIE_PASSWORD_LEN {
            return Err(ConfigError::Invalid {
                var: ENV_COOKIE_PASSWORD,
                reason: format!("must be at least {MIN_COOKIE_PASSWORD_LEN} bytes"),
            });
        }

        Url::parse(&self.redirect_uri).map_err(|e| ConfigError::Invalid {
            var: ENV_REDIRECT_URI,
            reason: e.to_string(),
        })?;

        let base = Url::parse(&self.api_base_url).map_err(|e| ConfigError::Invalid {
            var: ENV_API_BASE_URL,
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::Invalid {
                var: ENV_API_BASE_URL,
                reason: "not a base URL".to_string(),
            });
        }

        Ok(())
    }
}
