//! Server state shared across requests

use netforge_core::{
    AccountService, Config, CredentialService, TopologyService, TopologyStore,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub topology: TopologyService,
}

impl AppState {
    pub fn new(accounts: AccountService, topology: TopologyService) -> Self {
        Self { accounts, topology }
    }

    /// Build both services over `store` from the loaded configuration
    pub fn from_config(store: Arc<TopologyStore>, config: &Config) -> Self {
        let credentials = Arc::new(CredentialService::new(&config.auth));
        Self {
            accounts: AccountService::new(Arc::clone(&store), credentials),
            topology: TopologyService::new(store, config.topology.link_policy),
        }
    }
}
