//! HS256 bearer tokens
//!
//! Compact JWS strings (`header.payload.signature`, base64url without
//! padding) so that any JWT library can read them. Only `HS256` is accepted.

use super::error::{CredentialError, CredentialResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to
    pub sub: String,
    /// Expiry, seconds since the Unix epoch
    pub exp: u64,
}

fn mac(key: &[u8]) -> CredentialResult<HmacSha256> {
    HmacSha256::new_from_slice(key)
        .map_err(|e| CredentialError::Hashing(format!("invalid signing key: {e}")))
}

fn decode_part<T: for<'de> Deserialize<'de>>(part: &str) -> CredentialResult<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|_| CredentialError::InvalidToken)?;
    serde_json::from_slice(&bytes).map_err(|_| CredentialError::InvalidToken)
}

/// Sign `claims` with `key`
pub fn sign(claims: &Claims, key: &[u8]) -> CredentialResult<String> {
    let header = Header {
        alg: ALGORITHM.to_string(),
        typ: "JWT".to_string(),
    };
    let header = serde_json::to_vec(&header).map_err(|e| CredentialError::Hashing(e.to_string()))?;
    let payload = serde_json::to_vec(claims).map_err(|e| CredentialError::Hashing(e.to_string()))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(payload)
    );

    let mut mac = mac(key)?;
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();

    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

/// Check signature and expiry of `token` as of `now` (seconds since epoch)
pub fn verify(token: &str, key: &[u8], now: u64) -> CredentialResult<Claims> {
    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(CredentialError::InvalidToken);
    };

    let parsed: Header = decode_part(header)?;
    if parsed.alg != ALGORITHM {
        return Err(CredentialError::InvalidToken);
    }

    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| CredentialError::InvalidToken)?;

    let mut mac = mac(key)?;
    mac.update(header.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| CredentialError::InvalidToken)?;

    let claims: Claims = decode_part(payload)?;
    if claims.exp <= now {
        return Err(CredentialError::InvalidToken);
    }

    Ok(claims)
}
