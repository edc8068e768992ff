//! Cookie sealing for the WorkOS adapter
//!
//! Sealed value: `base64url(nonce || ciphertext || tag)`, AES-256-GCM under
//! SHA-256 of the cookie password.

use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use serde::{Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};

use crate::provider::errors::ProviderError;
use crate::provider::types::SealedSession;
use crate::utils::{base64url_decode, base64url_encode, gen_random_bytes};

const SEAL_AAD: &[u8] = b"authkit-session:v1";

fn derive_key(cookie_password: &str) -> Result<LessSafeKey, ProviderError> {
    let digest = Sha256::digest(cookie_password.as_bytes());
    let unbound = UnboundKey::new(&AES_256_GCM, digest.as_slice())
        .map_err(|_| ProviderError::Seal("Failed to derive sealing key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

pub(crate) fn seal_data<T: Serialize>(
    data: &T,
    cookie_password: &str,
) -> Result<SealedSession, ProviderError> {
    let key = derive_key(cookie_password)?;
    let mut in_out = serde_json::to_vec(data).map_err(|e| ProviderError::Serde(e.to_string()))?;

    let nonce_bytes = gen_random_bytes::<NONCE_LEN>()?;
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::from(SEAL_AAD),
        &mut in_out,
    )
    .map_err(|_| ProviderError::Seal("Failed to seal session".to_string()))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&in_out);

    Ok(SealedSession::new(base64url_encode(&sealed)))
}

pub(crate) fn unseal_data<T: DeserializeOwned>(
    sealed: &SealedSession,
    cookie_password: &str,
) -> Result<T, ProviderError> {
    let raw = base64url_decode(sealed.as_str())
        .map_err(|_| ProviderError::Seal("Sealed session is not base64url".to_string()))?;

    if raw.len() <= NONCE_LEN {
        return Err(ProviderError::Seal("Sealed session is too short".to_string()));
    }

    let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
        .map_err(|_| ProviderError::Seal("Invalid nonce".to_string()))?;

    let key = derive_key(cookie_password)?;
    let mut in_out = ciphertext.to_vec();
    let plaintext = key
        .open_in_place(nonce, Aad::from(SEAL_AAD), &mut in_out)
        .map_err(|_| ProviderError::Seal("Failed to unseal session".to_string()))?;

    serde_json::from_slice(plaintext).map_err(|e| ProviderError::Serde(e.to_string()))
}
