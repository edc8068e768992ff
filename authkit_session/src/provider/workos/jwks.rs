use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

use super::types::AccessTokenClaims;
use crate::provider::types::FailureReason;

const CACHE_EXPIRATION: Duration = Duration::from_secs(600);

/// Tolerated clock skew when checking `exp`
const LEEWAY_SECS: u64 = 2;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Jwk {
    kty: String,
    kid: String,
    #[serde(default)]
    alg: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenVerificationError {
    #[error("Failed to fetch JWKs: {0}")]
    JwksFetch(String),

    #[error("No matching key found in JWKs")]
    NoMatchingKey,

    #[error("Missing key component: {0}")]
    MissingKeyComponent(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl TokenVerificationError {
    pub(crate) fn failure_reason(&self) -> FailureReason {
        match self {
            Self::TokenExpired => FailureReason::Expired,
            Self::JwksFetch(_) => FailureReason::ProviderUnavailable,
            _ => FailureReason::InvalidJwt,
        }
    }
}

struct CachedJwks {
    jwks: Jwks,
    fetched_at: Instant,
}

/// Signing keys of one client, refreshed every ten minutes
pub(crate) struct JwksCache {
    url: String,
    client: reqwest::Client,
    cached: RwLock<Option<CachedJwks>>,
}

impl JwksCache {
    pub(crate) fn new(url: String, client: reqwest::Client) -> Self {
        Self {
            url,
            client,
            cached: RwLock::new(None),
        }
    }

    async fn fetch_jwks(&self, force: bool) -> Result<Jwks, TokenVerificationError> {
        if !force {
            if let Some(cached) = self.cached.read().await.as_ref() {
                if cached.fetched_at.elapsed() < CACHE_EXPIRATION {
                    tracing::debug!("Returning valid cached JWKs");
                    return Ok(cached.jwks.clone());
                }
            }
        }

        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TokenVerificationError::JwksFetch(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(TokenVerificationError::JwksFetch(format!(
                "JWKs endpoint returned {}",
                resp.status()
            )));
        }
        let jwks: Jwks = resp
            .json()
            .await
            .map_err(|e| TokenVerificationError::JwksFetch(e.to_string()))?;
        tracing::debug!("JWKs fetched from {}", self.url);

        *self.cached.write().await = Some(CachedJwks {
            jwks: jwks.clone(),
            fetched_at: Instant::now(),
        });

        Ok(jwks)
    }

    /// Verify an access token signature and expiry, returning its claims
    pub(crate) async fn verify_access_token(
        &self,
        token: &str,
    ) -> Result<AccessTokenClaims, TokenVerificationError> {
        let jwks = self.fetch_jwks(false).await?;
        match verify_with_jwks(token, &jwks) {
            // Keys may have rotated since the last fetch
            Err(TokenVerificationError::NoMatchingKey) => {
                tracing::debug!("No matching key in cached JWKs, refetching");
                let jwks = self.fetch_jwks(true).await?;
                verify_with_jwks(token, &jwks)
            }
            other => other,
        }
    }
}

fn find_jwk<'a>(jwks: &'a Jwks, kid: &str) -> Option<&'a Jwk> {
    jwks.keys.iter().find(|key| key.kid == kid)
}

fn convert_jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, TokenVerificationError> {
    if jwk.kty != "RSA" {
        return Err(TokenVerificationError::UnsupportedAlgorithm(
            jwk.kty.clone(),
        ));
    }
    match jwk.alg.as_deref() {
        None | Some("RS256") => {}
        Some(alg) => return Err(TokenVerificationError::UnsupportedAlgorithm(alg.to_string())),
    }

    let n = jwk
        .n
        .as_deref()
        .ok_or(TokenVerificationError::MissingKeyComponent("n".to_string()))?;
    let e = jwk
        .e
        .as_deref()
        .ok_or(TokenVerificationError::MissingKeyComponent("e".to_string()))?;

    DecodingKey::from_rsa_components(n, e)
        .map_err(|e| TokenVerificationError::InvalidToken(e.to_string()))
}

fn verify_with_jwks(token: &str, jwks: &Jwks) -> Result<AccessTokenClaims, TokenVerificationError> {
    let header = jsonwebtoken::decode_header(token)
        .map_err(|e| TokenVerificationError::InvalidToken(e.to_string()))?;
    if header.alg != Algorithm::RS256 {
        return Err(TokenVerificationError::UnsupportedAlgorithm(format!(
            "{:?}",
            header.alg
        )));
    }
    let kid = header
        .kid
        .ok_or(TokenVerificationError::MissingKeyComponent(
            "kid".to_string(),
        ))?;

    let jwk = find_jwk(jwks, &kid).ok_or(TokenVerificationError::NoMatchingKey)?;
    let decoding_key = convert_jwk_to_decoding_key(jwk)?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_aud = false;
    validation.leeway = LEEWAY_SECS;

    let data = jsonwebtoken::decode::<AccessTokenClaims>(token, &decoding_key, &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenVerificationError::TokenExpired,
            _ => TokenVerificationError::InvalidToken(e.to_string()),
        })?;

    Ok(data.claims)
}
