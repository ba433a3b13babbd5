use std::sync::Arc;
use aerofacil_core::repository::UserRepository;
use aerofacil_core::{Marketplace, MarketplaceRules, Repositories};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
    pub secure_cookies: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub marketplace: Arc<Marketplace>,
    pub users: Arc<dyn UserRepository>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(repos: Repositories, rules: MarketplaceRules, auth: AuthConfig) -> Self {
        Self {
            users: repos.users.clone(),
            marketplace: Arc::new(Marketplace::new(repos, rules)),
            auth,
        }
    }
}
