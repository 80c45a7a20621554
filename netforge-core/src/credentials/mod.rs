//! Passwords and bearer tokens
//!
//! [`CredentialService`] hashes passwords with argon2 and issues HS256 tokens
//! whose subject is the username. [`AccountService`] ties both to the user
//! table.

pub mod accounts;
pub mod error;
pub mod token;

pub use accounts::AccountService;
pub use error::{CredentialError, CredentialResult};
pub use token::Claims;

use crate::config::AuthConfig;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Response body of a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

impl AccessToken {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Password hashing and token signing
pub struct CredentialService {
    secret: SecretString,
    token_ttl: Duration,
}

impl CredentialService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: SecretString::new(config.secret_key.clone()),
            token_ttl: config.token_ttl,
        }
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Argon2 PHC string for `password` with a fresh salt
    pub fn hash_password(&self, password: &str) -> CredentialResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?
            .to_string())
    }

    /// `InvalidCredentials` unless `password` matches `password_hash`
    pub fn verify_password(&self, password: &str, password_hash: &str) -> CredentialResult<()> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| CredentialError::Hashing(format!("stored hash unreadable: {e}")))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| CredentialError::InvalidCredentials)
    }

    pub fn issue_token(&self, username: &str) -> CredentialResult<AccessToken> {
        self.issue_token_at(username, unix_now())
    }

    /// Issue a token as if the current time were `now` (seconds since epoch)
    pub fn issue_token_at(&self, username: &str, now: u64) -> CredentialResult<AccessToken> {
        let claims = Claims {
            sub: username.to_string(),
            exp: now.saturating_add(self.token_ttl.as_secs()),
        };
        let token = token::sign(&claims, self.secret.expose_secret().as_bytes())?;
        Ok(AccessToken::bearer(token))
    }

    pub fn decode_token(&self, token: &str) -> CredentialResult<Claims> {
        self.decode_token_at(token, unix_now())
    }

    pub fn decode_token_at(&self, token: &str, now: u64) -> CredentialResult<Claims> {
        token::verify(token, self.secret.expose_secret().as_bytes(), now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CredentialService {
        CredentialService::new(&AuthConfig {
            secret_key: "test-secret-key-for-unit-tests".to_string(),
            token_ttl: Duration::from_secs(60),
        })
    }

    #[test]
    fn test_hash_and_verify_password() {
        let credentials = service();
        let hash = credentials.hash_password("hunter22").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(credentials.verify_password("hunter22", &hash).is_ok());
        assert!(matches!(
            credentials.verify_password("hunter23", &hash),
            Err(CredentialError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let credentials = service();
        let a = credentials.hash_password("same").unwrap();
        let b = credentials.hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_is_hashing_error() {
        let result = service().verify_password("pw", "not-a-phc-string");
        assert!(matches!(result, Err(CredentialError::Hashing(_))));
    }

    #[test]
    fn test_token_round_trip_and_expiry() {
        let credentials = service();
        let token = credentials.issue_token_at("alice", 1_000).unwrap();
        assert_eq!(token.token_type, "bearer");

        let claims = credentials.decode_token_at(&token.access_token, 1_030).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp, 1_060);

        assert!(matches!(
            credentials.decode_token_at(&token.access_token, 1_060),
            Err(CredentialError::InvalidToken)
        ));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let token = service().issue_token("alice").unwrap();
        let other = CredentialService::new(&AuthConfig {
            secret_key: "a-completely-different-secret".to_string(),
            token_ttl: Duration::from_secs(60),
        });

        assert!(matches!(
            other.decode_token(&token.access_token),
            Err(CredentialError::InvalidToken)
        ));
    }
}
