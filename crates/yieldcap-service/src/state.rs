//! Application state.

use std::sync::Arc;

use yieldcap_store::RocksStore;

use crate::auth::JwtKeys;
use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Bearer token signing and verification keys.
    pub jwt: JwtKeys,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        let jwt = JwtKeys::from_secret(&config.jwt_secret);

        if config.admin_key.is_none() {
            tracing::warn!("ADMIN_KEY not configured - admin endpoints will reject every request");
        }

        Self { store, config, jwt }
    }
}
