//! Cryptographic utilities for signing storage requests.

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Errors raised while preparing or using signing keys.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Signing key is not valid base64")]
    InvalidKeyEncoding,

    #[error("Signing key is empty")]
    EmptyKey,
}

/// Decodes a base64-encoded signing key (e.g. a storage account key).
pub fn decode_signing_key(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    let key = STANDARD
        .decode(encoded.trim())
        .map_err(|_| CryptoError::InvalidKeyEncoding)?;
    if key.is_empty() {
        return Err(CryptoError::EmptyKey);
    }
    Ok(key)
}

/// Signs `message` with HMAC-SHA256 and returns the base64-encoded MAC.
pub fn hmac_sha256_base64(key: &[u8], message: &str) -> Result<String, CryptoError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| CryptoError::EmptyKey)?;
    mac.update(message.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
