//! Registration, login and token-to-user resolution

use super::error::{CredentialError, CredentialResult};
use super::{AccessToken, CredentialService};
use crate::model::User;
use crate::storage::TopologyStore;
use std::sync::Arc;
use tracing::{debug, info};

/// User accounts backed by the topology store
#[derive(Clone)]
pub struct AccountService {
    store: Arc<TopologyStore>,
    credentials: Arc<CredentialService>,
}

impl AccountService {
    pub fn new(store: Arc<TopologyStore>, credentials: Arc<CredentialService>) -> Self {
        Self { store, credentials }
    }

    pub fn credentials(&self) -> &CredentialService {
        &self.credentials
    }

    /// Create a user; fails with `StoreError::UsernameTaken` if the name exists
    pub async fn register(&self, username: String, password: String) -> CredentialResult<User> {
        let store = Arc::clone(&self.store);
        let credentials = Arc::clone(&self.credentials);

        let user = tokio::task::spawn_blocking(move || -> CredentialResult<User> {
            let hash = credentials.hash_password(&password)?;
            Ok(store.create_user(&username, &hash)?)
        })
        .await??;

        info!(user_id = %user.id, username = %user.username, "registered user");
        Ok(user)
    }

    /// Exchange a username and password for a bearer token
    pub async fn authenticate(&self, username: String, password: String) -> CredentialResult<AccessToken> {
        let store = Arc::clone(&self.store);
        let credentials = Arc::clone(&self.credentials);

        tokio::task::spawn_blocking(move || -> CredentialResult<AccessToken> {
            let user = store
                .find_user_by_name(&username)?
                .ok_or(CredentialError::InvalidCredentials)?;
            credentials.verify_password(&password, &user.password_hash)?;

            debug!(user_id = %user.id, "issued access token");
            credentials.issue_token(&user.username)
        })
        .await?
    }

    /// The user a bearer token was issued to
    pub async fn current_user(&self, token: &str) -> CredentialResult<User> {
        let claims = self.credentials.decode_token(token)?;
        let store = Arc::clone(&self.store);

        tokio::task::spawn_blocking(move || -> CredentialResult<User> {
            store
                .find_user_by_name(&claims.sub)?
                .ok_or(CredentialError::InvalidToken)
        })
        .await?
    }
}
