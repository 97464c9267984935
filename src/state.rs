use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::{AccessPolicy, Config};
use crate::store::Store;

/// Everything a handler needs, built once at startup and shared read-only
/// through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub policy: AccessPolicy,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, secret: Option<String>, policy: AccessPolicy) -> Self {
        Self {
            store,
            tokens: TokenService::new(secret, policy.enforce_task_ownership),
            policy,
        }
    }

    pub fn from_config(store: Arc<dyn Store>, config: &Config) -> Self {
        Self::new(store, config.secret_key.clone(), config.policy)
    }
}
