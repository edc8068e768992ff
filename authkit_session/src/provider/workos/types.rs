use serde::{Deserialize, Serialize};

use crate::provider::types::UserIdentity;

/// Plaintext inside the sealed session cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SessionCookieData {
    pub(crate) user: UserIdentity,
    #[serde(default)]
    pub(crate) organization_id: Option<String>,
    /// JWT describing the session
    pub(crate) access_token: String,
    /// Exchanged for a new access token on refresh
    pub(crate) refresh_token: String,
}

impl From<AuthenticationResponse> for SessionCookieData {
    fn from(response: AuthenticationResponse) -> Self {
        Self {
            user: response.user,
            organization_id: response.organization_id,
            access_token: response.access_token,
            refresh_token: response.refresh_token,
        }
    }
}

/// Claims read from the access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AccessTokenClaims {
    /// Session identifier, used to build the logout URL
    pub(crate) sid: String,
    pub(crate) sub: String,
    pub(crate) exp: i64,
    #[serde(default)]
    pub(crate) org_id: Option<String>,
    #[serde(default)]
    pub(crate) role: Option<String>,
    #[serde(default)]
    pub(crate) permissions: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
pub(super) enum AuthenticateRequest<'a> {
    AuthorizationCode {
        client_id: &'a str,
        client_secret: &'a str,
        code: &'a str,
    },
    RefreshToken {
        client_id: &'a str,
        client_secret: &'a str,
        refresh_token: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        organization_id: Option<&'a str>,
    },
}

/// Body of a successful `/user_management/authenticate` call
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AuthenticationResponse {
    pub(crate) user: UserIdentity,
    #[serde(default)]
    pub(crate) organization_id: Option<String>,
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
    #[serde(default)]
    pub(crate) authentication_method: Option<String>,
}

/// Error body; the API uses both OAuth-style and generic shapes
#[derive(Debug, Default, Deserialize)]
pub(super) struct ApiErrorBody {
    pub(super) error: Option<String>,
    pub(super) error_description: Option<String>,
    pub(super) code: Option<String>,
    pub(super) message: Option<String>,
}

impl ApiErrorBody {
    pub(super) fn code(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.code.clone())
            .unwrap_or_else(|| "unknown_error".to_string())
    }

    pub(super) fn message(&self) -> String {
        self.error_description
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_default()
    }
}
